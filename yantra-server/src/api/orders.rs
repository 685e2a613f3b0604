//! Customer order endpoints (session required)

use axum::{Json, extract::State, http::StatusCode};
use shared::error::AppError;
use shared::models::{CreateOrderRequest, Order};

use super::ApiResult;
use crate::auth::SessionIdentity;
use crate::db;
use crate::orders;
use crate::state::AppState;

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    identity: SessionIdentity,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = orders::place_order(
        &state.pool,
        state.notifier.as_ref(),
        &state.shipping,
        &identity,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/mine
pub async fn my_orders(
    State(state): State<AppState>,
    identity: SessionIdentity,
) -> ApiResult<Vec<Order>> {
    let Some(user) = db::users::find_by_external_id(&state.pool, &identity.external_id)
        .await
        .map_err(super::internal)?
    else {
        return Ok(Json(Vec::new()));
    };
    let orders = db::orders::list_for_user(&state.pool, user.id)
        .await
        .map_err(super::internal)?;
    Ok(Json(orders))
}
