use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::suppliers::repo::Supplier;

#[derive(Debug, Deserialize)]
pub struct SupplierPayload {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl SupplierPayload {
    pub fn validate(&self) -> Result<&str, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Name is required".into()));
        }
        Ok(name)
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedSupplier {
    pub message: String,
    pub supplier: Supplier,
}
