use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::products::dto::ProductPayload;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub sku: Option<String>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Product joined with the names of its category and supplier.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductWithRefs {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub sku: Option<String>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub supplier_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub image_path: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn map_constraint(e: sqlx::Error) -> ApiError {
    match e {
        sqlx::Error::Database(ref d) if d.is_unique_violation() => {
            ApiError::Conflict("Product with this SKU already exists".into())
        }
        sqlx::Error::Database(ref d) if d.is_foreign_key_violation() => {
            ApiError::Validation("Invalid category or supplier ID".into())
        }
        other => ApiError::Store(other),
    }
}

const WITH_REFS: &str = r#"
    SELECT p.id, p.name, p.description, p.price, p.quantity, p.sku,
           p.category_id, p.supplier_id,
           c.name AS category_name,
           s.name AS supplier_name,
           p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON p.category_id = c.id
    LEFT JOIN suppliers s ON p.supplier_id = s.id
"#;

pub async fn list_all(db: &PgPool) -> Result<Vec<ProductWithRefs>, ApiError> {
    let rows = sqlx::query_as::<_, ProductWithRefs>(&format!(
        "{WITH_REFS} ORDER BY p.created_at DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> Result<Option<ProductWithRefs>, ApiError> {
    let row = sqlx::query_as::<_, ProductWithRefs>(&format!("{WITH_REFS} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn list_by_category(db: &PgPool, category_id: Uuid) -> Result<Vec<Product>, ApiError> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, description, price, quantity, sku,
               category_id, supplier_id, created_at, updated_at
        FROM products
        WHERE category_id = $1
        ORDER BY name
        "#,
    )
    .bind(category_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_low_stock(db: &PgPool, threshold: i32) -> Result<Vec<Product>, ApiError> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, description, price, quantity, sku,
               category_id, supplier_id, created_at, updated_at
        FROM products
        WHERE quantity <= $1
        ORDER BY quantity ASC
        "#,
    )
    .bind(threshold)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn create(db: &PgPool, payload: &ProductPayload) -> Result<Product, ApiError> {
    let (price, quantity) = payload.validate()?;
    let row = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, description, price, quantity, sku, category_id, supplier_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, name, description, price, quantity, sku,
                  category_id, supplier_id, created_at, updated_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(price)
    .bind(quantity)
    .bind(&payload.sku)
    .bind(payload.category_id)
    .bind(payload.supplier_id)
    .fetch_one(db)
    .await
    .map_err(map_constraint)?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    payload: &ProductPayload,
) -> Result<Option<Product>, ApiError> {
    let (price, quantity) = payload.validate()?;
    let row = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $1, description = $2, price = $3, quantity = $4, sku = $5,
            category_id = $6, supplier_id = $7, updated_at = now()
        WHERE id = $8
        RETURNING id, name, description, price, quantity, sku,
                  category_id, supplier_id, created_at, updated_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(price)
    .bind(quantity)
    .bind(&payload.sku)
    .bind(payload.category_id)
    .bind(payload.supplier_id)
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(map_constraint)?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<Option<Product>, ApiError> {
    let row = sqlx::query_as::<_, Product>(
        r#"
        DELETE FROM products
        WHERE id = $1
        RETURNING id, name, description, price, quantity, sku,
                  category_id, supplier_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

// ---- images ----

pub async fn list_images(db: &PgPool, product_id: Uuid) -> Result<Vec<ProductImage>, ApiError> {
    let rows = sqlx::query_as::<_, ProductImage>(
        r#"
        SELECT id, product_id, image_path, created_at
        FROM product_images
        WHERE product_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(product_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Images for a whole listing in one query.
pub async fn list_images_for(
    db: &PgPool,
    product_ids: &[Uuid],
) -> Result<Vec<ProductImage>, ApiError> {
    let rows = sqlx::query_as::<_, ProductImage>(
        r#"
        SELECT id, product_id, image_path, created_at
        FROM product_images
        WHERE product_id = ANY($1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(product_ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn insert_image(
    db: &PgPool,
    product_id: Uuid,
    image_path: &str,
) -> Result<ProductImage, ApiError> {
    let row = sqlx::query_as::<_, ProductImage>(
        r#"
        INSERT INTO product_images (product_id, image_path)
        VALUES ($1, $2)
        RETURNING id, product_id, image_path, created_at
        "#,
    )
    .bind(product_id)
    .bind(image_path)
    .fetch_one(db)
    .await
    .map_err(|e| match e {
        // FK violation here means the product is gone.
        sqlx::Error::Database(ref d) if d.is_foreign_key_violation() => {
            ApiError::NotFound("Product not found".into())
        }
        other => ApiError::Store(other),
    })?;
    Ok(row)
}

pub async fn delete_image(
    db: &PgPool,
    product_id: Uuid,
    image_id: Uuid,
) -> Result<Option<ProductImage>, ApiError> {
    let row = sqlx::query_as::<_, ProductImage>(
        r#"
        DELETE FROM product_images
        WHERE id = $1 AND product_id = $2
        RETURNING id, product_id, image_path, created_at
        "#,
    )
    .bind(image_id)
    .bind(product_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
