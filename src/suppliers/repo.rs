use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::suppliers::dto::SupplierPayload;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn list_all(db: &PgPool) -> Result<Vec<Supplier>, ApiError> {
    let rows = sqlx::query_as::<_, Supplier>(
        r#"
        SELECT id, name, email, phone, address, created_at, updated_at
        FROM suppliers
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> Result<Option<Supplier>, ApiError> {
    let row = sqlx::query_as::<_, Supplier>(
        r#"
        SELECT id, name, email, phone, address, created_at, updated_at
        FROM suppliers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn create(db: &PgPool, payload: &SupplierPayload) -> Result<Supplier, ApiError> {
    let name = payload.validate()?;
    let row = sqlx::query_as::<_, Supplier>(
        r#"
        INSERT INTO suppliers (name, email, phone, address)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, phone, address, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    payload: &SupplierPayload,
) -> Result<Option<Supplier>, ApiError> {
    let name = payload.validate()?;
    let row = sqlx::query_as::<_, Supplier>(
        r#"
        UPDATE suppliers
        SET name = $1, email = $2, phone = $3, address = $4, updated_at = now()
        WHERE id = $5
        RETURNING id, name, email, phone, address, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<Option<Supplier>, ApiError> {
    let row = sqlx::query_as::<_, Supplier>(
        r#"
        DELETE FROM suppliers
        WHERE id = $1
        RETURNING id, name, email, phone, address, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
