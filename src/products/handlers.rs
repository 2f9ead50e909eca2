use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    error::ApiError,
    products::{
        dto::{
            DeletedImage, DeletedProduct, LowStockParams, ProductDetails, ProductPayload,
            UploadedImages,
        },
        repo::{self, Product, ProductImage},
        services::{self, UploadItem},
    },
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/low-stock", get(low_stock))
        .route("/products/category/:category_id", get(by_category))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/:id/images", post(upload_images))
        .route("/products/:id/images/:image_id", delete(delete_image))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB uploads
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<ProductDetails>>, ApiError> {
    let products = repo::list_all(&state.db).await?;
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

    let mut by_product: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
    for image in repo::list_images_for(&state.db, &ids).await? {
        by_product.entry(image.product_id).or_default().push(image);
    }

    let items = products
        .into_iter()
        .map(|p| {
            let images = by_product.remove(&p.id).unwrap_or_default();
            ProductDetails::from_refs(p, images)
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDetails>, ApiError> {
    let product = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    let images = repo::list_images(&state.db, id).await?;
    Ok(Json(ProductDetails::from_refs(product, images)))
}

#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(repo::list_by_category(&state.db, category_id).await?))
}

#[instrument(skip(state))]
pub async fn low_stock(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(params): Query<LowStockParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(repo::list_low_stock(&state.db, params.threshold).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = repo::create(&state.db, &payload).await?;
    info!(actor = %actor.id, product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, ApiError> {
    let product = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    info!(actor = %actor.id, product_id = %product.id, "product updated");
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedProduct>, ApiError> {
    let product = repo::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    info!(actor = %actor.id, product_id = %product.id, "product deleted");
    Ok(Json(DeletedProduct {
        message: "Product deleted successfully".into(),
        product,
    }))
}

/// POST /products/:id/images — multipart `images` fields.
#[instrument(skip(state, mp))]
pub async fn upload_images(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<UploadedImages>), ApiError> {
    let mut files: Vec<UploadItem> = Vec::new();
    // A stream error mid-body must fail the whole request; attaching only the
    // parts that arrived before the cut would report success for a partial set.
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Malformed multipart body".into()))?
    {
        if field.name() != Some("images") && field.name() != Some("images[]") {
            continue;
        }
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation("Malformed multipart body".into()))?;
        files.push(UploadItem {
            body,
            content_type,
            file_name,
        });
    }
    if files.is_empty() {
        return Err(ApiError::Validation("images field is required".into()));
    }

    let images = services::attach_images(&state, id, files).await?;
    info!(actor = %actor.id, product_id = %id, count = images.len(), "images uploaded");
    Ok((StatusCode::CREATED, Json(UploadedImages { images })))
}

#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DeletedImage>, ApiError> {
    let image = services::remove_image(&state, id, image_id).await?;
    info!(actor = %actor.id, product_id = %id, image_id = %image.id, "image deleted");
    Ok(Json(DeletedImage {
        message: "Image deleted successfully".into(),
        image,
    }))
}

#[cfg(test)]
mod upload_tests {
    use super::*;
    use crate::auth::repo_types::Role;
    use crate::auth::services::CurrentUser;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    fn actor() -> AuthUser {
        AuthUser(CurrentUser {
            id: Uuid::new_v4(),
            email: "staff@x.com".into(),
            role: Role::Staff,
            name: "Staff".into(),
        })
    }

    async fn multipart_from(body: String) -> Multipart {
        let req = Request::builder()
            .header(
                "content-type",
                "multipart/form-data; boundary=XBOUNDARY",
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(req, &()).await.unwrap()
    }

    #[tokio::test]
    async fn upload_rejects_body_truncated_mid_part() {
        let state = AppState::fake();
        // One complete part, then a part cut off inside its headers. The
        // request must fail outright, not attach the first file.
        let body = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"images\"; filename=\"a.jpg\"\r\n",
            "Content-Type: image/jpeg\r\n",
            "\r\n",
            "hello\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"im",
        )
        .to_string();
        let mp = multipart_from(body).await;

        let err = upload_images(State(state), actor(), Path(Uuid::new_v4()), mp)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_rejects_body_with_no_images_field() {
        let state = AppState::fake();
        let body = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"notes\"\r\n",
            "\r\n",
            "just text\r\n",
            "--XBOUNDARY--\r\n",
        )
        .to_string();
        let mp = multipart_from(body).await;

        let err = upload_images(State(state), actor(), Path(Uuid::new_v4()), mp)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
