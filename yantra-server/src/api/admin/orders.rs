//! Order overview for administrators

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::models::Order;

use crate::api::ApiResult;
use crate::api::extract::Query;
use crate::db;
use crate::state::AppState;

const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    /// `(limit, offset)` with page numbers starting at 1
    fn bounds(&self) -> (i64, i64) {
        let per_page = self.per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE);
        let page = self.page.unwrap_or(1).max(1);
        (per_page, (page - 1).saturating_mul(per_page))
    }
}

/// GET /api/admin/orders?page=&perPage=
pub async fn list(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Vec<Order>> {
    let (limit, offset) = pagination.bounds();
    let orders = db::orders::list_all(&state.pool, limit, offset)
        .await
        .map_err(crate::api::internal)?;
    Ok(Json(orders))
}
