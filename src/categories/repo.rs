use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn map_unique(e: sqlx::Error) -> ApiError {
    match e {
        sqlx::Error::Database(ref d) if d.is_unique_violation() => {
            ApiError::Conflict("Category with this name already exists".into())
        }
        other => ApiError::Store(other),
    }
}

pub async fn list_all(db: &PgPool) -> Result<Vec<Category>, ApiError> {
    let rows = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM categories
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> Result<Option<Category>, ApiError> {
    let row = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM categories
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn create(
    db: &PgPool,
    name: &str,
    description: Option<&str>,
) -> Result<Category, ApiError> {
    let row = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(db)
    .await
    .map_err(map_unique)?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Option<Category>, ApiError> {
    let row = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $1, description = $2, updated_at = now()
        WHERE id = $3
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(map_unique)?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<Option<Category>, ApiError> {
    let row = sqlx::query_as::<_, Category>(
        r#"
        DELETE FROM categories
        WHERE id = $1
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
