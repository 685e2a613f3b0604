//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Maximum quantity accepted for a single order line
pub const MAX_LINE_QUANTITY: i32 = 99;

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "order_status", rename_all = "UPPERCASE")
)]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

/// Shipping details captured at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

impl ShippingDetails {
    /// Surrounding whitespace removed, blank optional parts dropped
    ///
    /// Validate the trimmed value so a whitespace-only name counts as empty.
    pub fn trimmed(self) -> Self {
        fn text(s: String) -> String {
            s.trim().to_string()
        }
        fn opt(s: Option<String>) -> Option<String> {
            s.map(text).filter(|s| !s.is_empty())
        }
        Self {
            full_name: text(self.full_name),
            phone: text(self.phone),
            email: opt(self.email),
            address: text(self.address),
            city: opt(self.city),
            state: opt(self.state),
            pincode: opt(self.pincode),
        }
    }

    /// Single-line address as stored on the order
    pub fn formatted_address(&self) -> String {
        let mut parts = vec![self.address.trim().to_string()];
        for part in [&self.city, &self.state, &self.pincode].into_iter().flatten() {
            let part = part.trim();
            if !part.is_empty() {
                parts.push(part.to_string());
            }
        }
        parts.join(", ")
    }
}

/// Cart line as submitted by the client
///
/// `price`/`sale_price` are what the client displayed; the server re-prices
/// from the catalog and never trusts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub id: Uuid,
    pub quantity: i32,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    /// Selected variant name
    pub variant: Option<String>,
    #[serde(default)]
    pub energized: bool,
}

/// Create order payload
///
/// Fields are optional at the wire level so a missing field is reported by
/// name instead of as a generic deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shipping_details: Option<ShippingDetails>,
    pub cart_items: Option<Vec<CartItemInput>>,
    pub total: Option<Decimal>,
}

/// Order line with the unit price snapshotted at purchase time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub content_item_id: Uuid,
    pub name: String,
    pub variant: Option<String>,
    pub energized: bool,
    pub quantity: i32,
    pub price: Decimal,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    /// Cleared when the account is deleted upstream
    pub user_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}
