//! Content item administration

use axum::{Json, extract::State, http::StatusCode};
use shared::error::{AppError, ErrorCode};
use shared::models::{ContentItem, ContentItemCreate, ContentItemUpdate};
use uuid::Uuid;

use crate::api::extract::Path;
use crate::catalog::admin::{apply_item_update, prepare_item};
use crate::db;
use crate::state::AppState;

fn not_found(id: Uuid) -> AppError {
    AppError::new(ErrorCode::ProductNotFound).with_detail("productId", id.to_string())
}

/// POST /api/admin/content
pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<ContentItemCreate>,
) -> Result<(StatusCode, Json<ContentItem>), AppError> {
    let item = prepare_item(data)?;
    let created = db::content::insert(&state.pool, &item).await?;
    tracing::info!(item_id = %created.id, slug = %created.slug, "Content item created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/admin/content/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<ContentItemUpdate>,
) -> Result<Json<ContentItem>, AppError> {
    let existing = db::content::find_by_id(&state.pool, id)
        .await
        .map_err(crate::api::internal)?
        .ok_or_else(|| not_found(id))?;

    let item = apply_item_update(existing, data)?;
    let updated = db::content::update(&state.pool, &item).await?;
    tracing::info!(item_id = %updated.id, "Content item updated");
    Ok(Json(updated))
}

/// DELETE /api/admin/content/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !db::content::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(item_id = %id, "Content item deleted");
    Ok(StatusCode::NO_CONTENT)
}
