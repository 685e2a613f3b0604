//! Review database operations

use shared::models::Review;
use sqlx::PgPool;
use uuid::Uuid;

use super::BoxError;
use crate::reviews::NewReview;

const REVIEW_COLUMNS: &str = "id, content_item_id, rating, comment, image_url, is_approved, \
     user_id, guest_name, guest_email, approved_at, approved_by, created_at";

pub async fn insert(pool: &PgPool, review: &NewReview) -> Result<Review, BoxError> {
    let row = sqlx::query_as::<_, Review>(&format!(
        r#"
        INSERT INTO reviews (
            id, content_item_id, rating, comment, image_url, is_approved,
            user_id, guest_name, guest_email, approved_at, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                CASE WHEN $6 THEN NOW() END, NOW())
        RETURNING {REVIEW_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(review.content_item_id)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(&review.image_url)
    .bind(review.is_approved)
    .bind(review.user_id)
    .bind(&review.guest_name)
    .bind(&review.guest_email)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Approved reviews of one item, newest first
pub async fn list_approved(pool: &PgPool, content_item_id: Uuid) -> Result<Vec<Review>, BoxError> {
    let rows = sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews \
         WHERE content_item_id = $1 AND is_approved ORDER BY created_at DESC"
    ))
    .bind(content_item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Moderation queue, oldest first
pub async fn list_pending(pool: &PgPool) -> Result<Vec<Review>, BoxError> {
    let rows = sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE NOT is_approved ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Mark a review approved. Returns None when it does not exist.
pub async fn approve(
    pool: &PgPool,
    id: Uuid,
    approved_by: Uuid,
) -> Result<Option<Review>, BoxError> {
    let row = sqlx::query_as::<_, Review>(&format!(
        r#"
        UPDATE reviews
        SET is_approved = TRUE, approved_at = NOW(), approved_by = $2
        WHERE id = $1
        RETURNING {REVIEW_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(approved_by)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Hard-delete a review. Returns false when it did not exist.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
