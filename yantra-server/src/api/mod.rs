//! HTTP routes for yantra-server

pub mod admin;
pub mod content;
pub mod extract;
pub mod health;
pub mod orders;
pub mod payment;
pub mod reviews;
pub mod webhooks;

use axum::routing::{delete, get, patch, post};
use axum::{Json, Router, middleware};
use http::{HeaderName, HeaderValue};
use shared::error::AppError;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{require_admin, require_session};
use crate::config::Config;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Log an infrastructure failure and hide it behind a generic 500
pub(crate) fn internal(e: impl std::fmt::Display) -> AppError {
    tracing::error!(error = %e, "Internal error");
    AppError::internal("Internal server error")
}

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = &config.cors_origins;
    if origins.is_empty() {
        if config.is_production() {
            tracing::warn!("CORS_ORIGINS not set, allowing any origin");
        }
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}

/// Create the combined router
pub fn create_router(state: AppState, config: &Config) -> Router {
    // Storefront browsing (no auth)
    let content = Router::new()
        .route("/api/content/categories", get(content::list_categories))
        .route("/api/content/categories/tree", get(content::category_tree))
        .route("/api/content/category-data", get(content::category_root))
        .route("/api/content/category-data/", get(content::category_root))
        .route(
            "/api/content/category-data/{*path}",
            get(content::category_data),
        )
        .route("/api/content/product-data/{slug}", get(content::product_data))
        .route("/api/content/products", get(content::list_products))
        .route("/api/search", get(content::search));

    // Reviews (guests allowed) and payment gateway
    let public = Router::new()
        .route("/api/reviews", post(reviews::submit_review))
        .route(
            "/api/reviews/product/{product_id}",
            get(reviews::product_reviews),
        )
        .route("/api/payment/create-order", post(payment::create_order))
        .route("/api/payment/verify", post(payment::verify));

    // Identity-provider webhook (signature-verified, raw body)
    let webhook = Router::new().route(
        "/api/webhooks/identity",
        post(webhooks::handle_identity_webhook),
    );

    // Customer orders (session required)
    let customer = Router::new()
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/mine", get(orders::my_orders))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    // Administration (admin role required)
    let admin = Router::new()
        .route("/categories", post(admin::categories::create))
        .route(
            "/categories/{id}",
            patch(admin::categories::update).delete(admin::categories::delete),
        )
        .route("/content", post(admin::content::create))
        .route(
            "/content/{id}",
            patch(admin::content::update).delete(admin::content::delete),
        )
        .route("/orders", get(admin::orders::list))
        .route("/reviews/pending", get(admin::reviews::pending))
        .route("/reviews/{id}/approve", post(admin::reviews::approve))
        .route("/reviews/{id}", delete(admin::reviews::reject))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(content)
        .merge(public)
        .merge(webhook)
        .merge(customer)
        .nest("/api/admin", admin)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(REQUEST_ID, XRequestId))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .with_state(state)
}
