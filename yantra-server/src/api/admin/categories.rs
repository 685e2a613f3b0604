//! Category administration

use axum::{Json, extract::State, http::StatusCode};
use shared::error::AppError;
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use uuid::Uuid;

use crate::api::extract::Path;
use crate::catalog::admin;
use crate::state::AppState;

/// POST /api/admin/categories
pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = admin::create_category(&state.pool, data).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PATCH /api/admin/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<CategoryUpdate>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(admin::update_category(&state.pool, id, data).await?))
}

/// DELETE /api/admin/categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    admin::delete_category(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
