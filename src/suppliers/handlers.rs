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
    error::ApiError,
    state::AppState,
    suppliers::{
        dto::{DeletedSupplier, SupplierPayload},
        repo::{self, Supplier},
    },
};

pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

#[instrument(skip(state))]
pub async fn list_suppliers(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    Ok(Json(repo::list_all(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn get_supplier(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Supplier not found".into()))?;
    Ok(Json(supplier))
}

#[instrument(skip(state, payload))]
pub async fn create_supplier(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<SupplierPayload>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let supplier = repo::create(&state.db, &payload).await?;
    info!(actor = %actor.id, supplier_id = %supplier.id, "supplier created");
    Ok((StatusCode::CREATED, Json(supplier)))
}

#[instrument(skip(state, payload))]
pub async fn update_supplier(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SupplierPayload>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Supplier not found".into()))?;
    info!(actor = %actor.id, supplier_id = %supplier.id, "supplier updated");
    Ok(Json(supplier))
}

#[instrument(skip(state))]
pub async fn delete_supplier(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedSupplier>, ApiError> {
    let supplier = repo::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Supplier not found".into()))?;
    info!(actor = %actor.id, supplier_id = %supplier.id, "supplier deleted");
    Ok(Json(DeletedSupplier {
        message: "Supplier deleted successfully".into(),
        supplier,
    }))
}
