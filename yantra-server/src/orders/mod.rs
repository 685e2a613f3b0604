//! Order placement
//!
//! Validate the request, re-price it from the catalog, persist it with
//! stock reserved atomically, then notify the customer and the store.
//! Notification failures never fail an order that has been committed.

pub mod pricing;

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{ContentItem, CreateOrderRequest, Order, UserUpsert};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::SessionIdentity;
use crate::db;
use crate::error::{BoxError, ServiceResult};
use crate::notify::{self, OrderNotifier};
use pricing::{PricedLine, ShippingPolicy, check_client_total, price_cart};

/// Fully priced order ready to persist
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub lines: Vec<PricedLine>,
}

/// Order storage seam
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ContentItem>, BoxError>;

    /// Create or refresh the local user record, returning its id
    async fn ensure_user(&self, user: &UserUpsert) -> ServiceResult<Uuid>;

    /// Persist the order and reserve stock in one transaction
    async fn insert_order(&self, order: &NewOrder) -> ServiceResult<Order>;
}

#[async_trait]
impl OrderStore for PgPool {
    async fn items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ContentItem>, BoxError> {
        db::content::find_by_ids(self, ids).await
    }

    async fn ensure_user(&self, user: &UserUpsert) -> ServiceResult<Uuid> {
        Ok(db::users::upsert(self, user).await?.id)
    }

    async fn insert_order(&self, order: &NewOrder) -> ServiceResult<Order> {
        db::orders::insert(self, order).await
    }
}

/// Local user record for a session, created on first use
pub fn user_from_session(identity: &SessionIdentity) -> Result<UserUpsert, AppError> {
    let email = identity
        .email
        .clone()
        .ok_or_else(|| AppError::invalid_token("Session token carries no email"))?;
    Ok(UserUpsert {
        external_id: identity.external_id.clone(),
        email,
        name: identity.name.clone(),
        image_url: None,
    })
}

pub async fn place_order<S, N>(
    store: &S,
    notifier: &N,
    shipping: &ShippingPolicy,
    identity: &SessionIdentity,
    request: CreateOrderRequest,
) -> ServiceResult<Order>
where
    S: OrderStore + ?Sized,
    N: OrderNotifier + ?Sized,
{
    let (details, cart, submitted_total) =
        match (request.shipping_details, request.cart_items, request.total) {
            (Some(details), Some(cart), Some(total)) => (details, cart, total),
            (details, cart, total) => {
                let missing: Vec<&str> = [
                    ("shippingDetails", details.is_none()),
                    ("cartItems", cart.is_none()),
                    ("total", total.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                return Err(AppError::missing_fields(&missing).into());
            }
        };

    let details = details.trimmed();
    details.validate().map_err(|e| {
        let mut err = AppError::from(e);
        err.code = ErrorCode::ShippingDetailsInvalid;
        err
    })?;
    if cart.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).into());
    }
    let user = user_from_session(identity)?;

    let mut ids: Vec<Uuid> = cart.iter().map(|line| line.id).collect();
    ids.sort_unstable();
    ids.dedup();
    let catalog: HashMap<Uuid, ContentItem> = store
        .items_by_ids(&ids)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    let priced = price_cart(&cart, &catalog, shipping)?;
    check_client_total(submitted_total, priced.total)?;

    let user_id = store.ensure_user(&user).await?;
    let new_order = NewOrder {
        id: Uuid::new_v4(),
        user_id,
        subtotal: priced.subtotal,
        shipping: priced.shipping,
        total: priced.total,
        customer_name: details.full_name.clone(),
        customer_phone: details.phone.clone(),
        customer_email: details.email.clone().or(Some(user.email)),
        shipping_address: details.formatted_address(),
        lines: priced.lines,
    };

    let order = store.insert_order(&new_order).await?;
    tracing::info!(
        order_id = %order.id,
        total = %order.total,
        lines = order.items.len(),
        "Order placed"
    );

    notify::order_placed(notifier, &order).await;
    Ok(order)
}
