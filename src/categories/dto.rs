use serde::{Deserialize, Serialize};

use crate::categories::repo::Category;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

impl CategoryPayload {
    pub fn validate(&self) -> Result<&str, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Name is required".into()));
        }
        Ok(name)
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedCategory {
    pub message: String,
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_and_requires_name() {
        let ok = CategoryPayload {
            name: "  Beverages  ".into(),
            description: None,
        };
        assert_eq!(ok.validate().unwrap(), "Beverages");

        let missing = CategoryPayload {
            name: "   ".into(),
            description: Some("whitespace only".into()),
        };
        assert!(missing.validate().is_err());
    }
}
