use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    categories::{
        dto::{CategoryPayload, DeletedCategory},
        repo::{self, Category},
    },
    error::ApiError,
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(repo::list_all(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    let category = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;
    Ok(Json(category))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let name = payload.validate()?;
    let category = repo::create(&state.db, name, payload.description.as_deref()).await?;
    info!(actor = %actor.id, category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>, ApiError> {
    let name = payload.validate()?;
    let category = repo::update(&state.db, id, name, payload.description.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;
    info!(actor = %actor.id, category_id = %category.id, "category updated");
    Ok(Json(category))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedCategory>, ApiError> {
    let category = repo::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;
    info!(actor = %actor.id, category_id = %category.id, "category deleted");
    Ok(Json(DeletedCategory {
        message: "Category deleted successfully".into(),
        category,
    }))
}
