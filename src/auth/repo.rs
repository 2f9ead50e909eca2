use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::auth::repo_types::{Role, User};
use crate::error::ApiError;

impl User {
    /// Insert a new user. Email uniqueness is enforced by the database
    /// constraint; two concurrent registrations cannot both succeed, and the
    /// loser sees a `Conflict`.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref d) if d.is_unique_violation() => {
                ApiError::Conflict("User with this email already exists".into())
            }
            other => ApiError::Store(other),
        })?;
        Ok(user)
    }

    /// Find a user by email, hash included (login needs it).
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by id. Selects the public projection only; the hash never
    /// leaves the database on this path.
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<PublicUser>, ApiError> {
        let user = sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Overwrite the password hash for an email. Returns `None` when the email
    /// is unknown; the caller decides whether that is worth reporting.
    pub async fn update_password_hash(
        db: &PgPool,
        email: &str,
        new_hash: &str,
    ) -> Result<Option<PublicUser>, ApiError> {
        let user = sqlx::query_as::<_, PublicUser>(
            r#"
            UPDATE users
            SET password_hash = $1,
                updated_at = now()
            WHERE email = $2
            RETURNING id, name, email, role, created_at, updated_at
            "#,
        )
        .bind(new_hash)
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
