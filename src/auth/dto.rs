use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for the password-reset endpoint.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "newPassword")]
    pub new_password: String,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Generic message body (used where the response must not leak anything).
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
}

/// Public projection of a user: everything except the password hash.
/// Also used as the row type for queries that must never touch the hash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forgot_password_accepts_camel_case_key() {
        let req: ForgotPasswordRequest =
            serde_json::from_str(r#"{"email":"a@x.com","newPassword":"s3cret"}"#).unwrap();
        assert_eq!(req.email, "a@x.com");
        assert_eq!(req.new_password, "s3cret");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert!(req.name.is_empty());
        assert!(req.password.is_empty());
    }
}
