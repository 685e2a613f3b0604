//! Public review endpoints

use axum::{Json, extract::State, http::StatusCode};
use shared::error::AppError;
use shared::models::{Review, ReviewCreate};
use uuid::Uuid;

use super::ApiResult;
use super::extract::Path;
use crate::auth::OptionalSession;
use crate::db;
use crate::reviews;
use crate::state::AppState;

/// POST /api/reviews
///
/// A valid session posts as that user; anyone else posts as a guest.
pub async fn submit_review(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    Json(input): Json<ReviewCreate>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let created = reviews::submit_review(&state.pool, session.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/reviews/product/{product_id}
pub async fn product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Vec<Review>> {
    let reviews = db::reviews::list_approved(&state.pool, product_id)
        .await
        .map_err(super::internal)?;
    Ok(Json(reviews))
}
