use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::products::repo::{Product, ProductImage, ProductWithRefs};

/// Request body for create and update; both validate the same way.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub sku: Option<String>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

impl ProductPayload {
    pub fn validate(&self) -> Result<(Decimal, i32), ApiError> {
        let (Some(price), Some(quantity)) = (self.price, self.quantity) else {
            return Err(ApiError::Validation(
                "Name, price, and quantity are required".into(),
            ));
        };
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation(
                "Name, price, and quantity are required".into(),
            ));
        }
        if price < Decimal::ZERO || quantity < 0 {
            return Err(ApiError::Validation(
                "Price and quantity must be non-negative".into(),
            ));
        }
        Ok((price, quantity))
    }
}

/// Product as listed/fetched: joined names plus attached image references.
#[derive(Debug, Serialize)]
pub struct ProductDetails {
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
    pub images: Vec<ProductImage>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ProductDetails {
    pub fn from_refs(p: ProductWithRefs, images: Vec<ProductImage>) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            quantity: p.quantity,
            sku: p.sku,
            category_id: p.category_id,
            supplier_id: p.supplier_id,
            category_name: p.category_name,
            supplier_name: p.supplier_name,
            images,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LowStockParams {
    #[serde(default = "default_threshold")]
    pub threshold: i32,
}

fn default_threshold() -> i32 {
    10
}

#[derive(Debug, Serialize)]
pub struct DeletedProduct {
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct UploadedImages {
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Serialize)]
pub struct DeletedImage {
    pub message: String,
    pub image: ProductImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, price: Option<&str>, quantity: Option<i32>) -> ProductPayload {
        ProductPayload {
            name: name.into(),
            description: None,
            price: price.map(|p| p.parse().unwrap()),
            quantity,
            sku: None,
            category_id: None,
            supplier_id: None,
        }
    }

    #[test]
    fn validate_accepts_complete_payload() {
        let (price, quantity) = payload("Widget", Some("9.99"), Some(3))
            .validate()
            .expect("valid payload");
        assert_eq!(price, "9.99".parse::<Decimal>().unwrap());
        assert_eq!(quantity, 3);
    }

    #[test]
    fn validate_rejects_missing_fields() {
        assert!(payload("", Some("1"), Some(1)).validate().is_err());
        assert!(payload("Widget", None, Some(1)).validate().is_err());
        assert!(payload("Widget", Some("1"), None).validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_values() {
        let err = payload("Widget", Some("-0.01"), Some(1)).validate().unwrap_err();
        assert!(err.to_string().contains("non-negative"));
        assert!(payload("Widget", Some("1"), Some(-1)).validate().is_err());
    }

    #[test]
    fn zero_price_and_quantity_are_allowed() {
        assert!(payload("Freebie", Some("0"), Some(0)).validate().is_ok());
    }

    #[test]
    fn price_deserializes_from_json_number() {
        let p: ProductPayload =
            serde_json::from_str(r#"{"name":"Widget","price":12.5,"quantity":4}"#).unwrap();
        assert_eq!(p.price, Some("12.5".parse().unwrap()));
    }
}
