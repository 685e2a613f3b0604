//! Review Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Product review
///
/// Exactly one identity is present: `user_id` for registered reviewers,
/// `guest_name` + `guest_email` for guests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub content_item_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub image_url: Option<String>,
    pub is_approved: bool,
    pub user_id: Option<Uuid>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Submit review payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreate {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub guest_name: Option<String>,
    #[validate(email)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub is_guest_review: bool,
}
