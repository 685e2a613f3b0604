//! Public catalog endpoints

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::models::{Category, CategoryNode, ContentItem};

use super::ApiResult;
use super::extract::{Path, Query};
use crate::catalog::service::{self, CategoryPage, ProductPage};
use crate::catalog::{CatalogRepository, ListingParams};
use crate::state::AppState;

/// GET /api/content/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let categories = state.pool.load_categories().await.map_err(super::internal)?;
    Ok(Json(categories))
}

/// GET /api/content/categories/tree
pub async fn category_tree(State(state): State<AppState>) -> ApiResult<Vec<CategoryNode>> {
    Ok(Json(service::category_tree(&state.pool).await?))
}

/// GET /api/content/category-data (no path)
pub async fn category_root(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> ApiResult<CategoryPage> {
    let page = service::category_page(&state.pool, "", &params.into()).await?;
    Ok(Json(page))
}

/// GET /api/content/category-data/{*path}
pub async fn category_data(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<ListingParams>,
) -> ApiResult<CategoryPage> {
    let page = service::category_page(&state.pool, &path, &params.into()).await?;
    Ok(Json(page))
}

/// GET /api/content/product-data/{slug}
pub async fn product_data(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<ProductPage> {
    Ok(Json(service::product_page(&state.pool, &slug).await?))
}

/// GET /api/content/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> ApiResult<Vec<ContentItem>> {
    Ok(Json(service::list_products(&state.pool, &params.into()).await?))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<ContentItem>> {
    Ok(Json(service::search(&state.pool, &query.q).await?))
}
