//! Content Item Model
//!
//! Products, services and articles share one table and one type,
//! distinguished by `type`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::category::ContentType;

/// Default availability status for newly created items
pub const DEFAULT_AVAILABILITY: &str = "In Stock";

/// One row of the specification table shown on the product page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub key: String,
    pub value: String,
}

/// Purchasable variant of an item; its pricing supersedes the parent's once selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub stock: Option<i32>,
}

/// Content item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    /// Ordered gallery, first image is the cover
    pub images: Vec<String>,
    #[serde(rename = "type")]
    pub item_type: ContentType,
    pub stock: i32,
    pub is_published: bool,
    pub availability: String,
    pub specifications: Vec<Specification>,
    pub benefits: Vec<String>,
    pub variants: Vec<Variant>,
    pub how_to_use: Vec<String>,
    pub package_contents: Vec<String>,
    /// Category ids (junction table)
    pub category_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Find a variant by its display name
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Whether stock is reserved when this item is ordered
    pub fn tracks_stock(&self) -> bool {
        self.item_type == ContentType::Product
    }
}

/// Create content item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContentItemCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Derived from `name` when omitted
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(rename = "type", default)]
    pub item_type: ContentType,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i32,
    #[serde(default)]
    pub is_published: bool,
    pub availability: Option<String>,
    #[serde(default)]
    pub specifications: Vec<Specification>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub how_to_use: Vec<String>,
    #[serde(default)]
    pub package_contents: Vec<String>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

/// Partial update payload (PATCH)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContentItemUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::util::double_option")]
    pub sale_price: Option<Option<Decimal>>,
    pub images: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub item_type: Option<ContentType>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub is_published: Option<bool>,
    pub availability: Option<String>,
    pub specifications: Option<Vec<Specification>>,
    pub benefits: Option<Vec<String>>,
    pub variants: Option<Vec<Variant>>,
    pub how_to_use: Option<Vec<String>>,
    pub package_contents: Option<Vec<String>>,
    pub category_ids: Option<Vec<Uuid>>,
}

/// Check the sale-price invariant: a sale price, when present, is below the list price
pub fn sale_price_is_valid(price: Decimal, sale_price: Option<Decimal>) -> bool {
    sale_price.is_none_or(|sale| sale >= Decimal::ZERO && sale < price)
}
