//! Review moderation

use axum::{Json, extract::State, http::StatusCode};
use shared::error::{AppError, ErrorCode};
use shared::models::Review;
use uuid::Uuid;

use crate::api::extract::Path;
use crate::api::{ApiResult, internal};
use crate::auth::SessionIdentity;
use crate::db;
use crate::orders::user_from_session;
use crate::state::AppState;

/// GET /api/admin/reviews/pending
pub async fn pending(State(state): State<AppState>) -> ApiResult<Vec<Review>> {
    let reviews = db::reviews::list_pending(&state.pool)
        .await
        .map_err(internal)?;
    Ok(Json(reviews))
}

/// POST /api/admin/reviews/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    identity: SessionIdentity,
    Path(id): Path<Uuid>,
) -> ApiResult<Review> {
    let admin = db::users::upsert(&state.pool, &user_from_session(&identity)?).await?;
    let review = db::reviews::approve(&state.pool, id, admin.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ReviewNotFound))?;

    tracing::info!(review_id = %id, approved_by = %admin.id, "Review approved");
    Ok(Json(review))
}

/// DELETE /api/admin/reviews/{id}
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !db::reviews::delete(&state.pool, id).await.map_err(internal)? {
        return Err(AppError::new(ErrorCode::ReviewNotFound));
    }
    tracing::info!(review_id = %id, "Review rejected");
    Ok(StatusCode::NO_CONTENT)
}
