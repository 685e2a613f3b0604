//! User database operations

use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserUpsert};
use sqlx::PgPool;
use uuid::Uuid;

use super::BoxError;
use crate::error::{ServiceResult, on_unique_violation};

const USER_COLUMNS: &str = "id, external_id, email, name, image_url, created_at, updated_at";

/// Insert or refresh a user keyed by identity-provider id
pub async fn upsert(pool: &PgPool, user: &UserUpsert) -> ServiceResult<User> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, external_id, email, name, image_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
        ON CONFLICT (external_id) DO UPDATE SET
            email = EXCLUDED.email,
            name = COALESCE(EXCLUDED.name, users.name),
            image_url = COALESCE(EXCLUDED.image_url, users.image_url),
            updated_at = NOW()
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&user.external_id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.image_url)
    .fetch_one(pool)
    .await
    .map_err(|e| on_unique_violation(e, AppError::new(ErrorCode::EmailExists)))
}

pub async fn find_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<User>, BoxError> {
    let row = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Remove a user. Their orders stay with `user_id` cleared; their reviews go.
pub async fn delete_by_external_id(pool: &PgPool, external_id: &str) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM users WHERE external_id = $1")
        .bind(external_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
