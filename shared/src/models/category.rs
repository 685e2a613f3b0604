//! Category Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Kind of catalog entry a category (or content item) holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "content_type", rename_all = "UPPERCASE")
)]
pub enum ContentType {
    #[default]
    Product,
    Service,
    Article,
}

/// Category entity
///
/// Categories form a forest through `parent_id`. Slugs are unique among
/// siblings only, so a slug alone does not identify a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "db", sqlx(rename = "type"))]
    pub category_type: ContentType,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with its children, used for navigation menus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Derived from `name` when omitted
    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub image: Option<String>,
    #[serde(rename = "type", default)]
    pub category_type: ContentType,
    pub parent_id: Option<Uuid>,
}

/// Update category payload
///
/// `parent_id` distinguishes "absent" (keep) from `null` (move to root).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<ContentType>,
    #[serde(default, deserialize_with = "crate::util::double_option")]
    pub parent_id: Option<Option<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&ContentType::Service).unwrap(),
            "\"SERVICE\""
        );
        let t: ContentType = serde_json::from_str("\"ARTICLE\"").unwrap();
        assert_eq!(t, ContentType::Article);
    }

    #[test]
    fn test_update_parent_absent_vs_null() {
        let keep: CategoryUpdate = serde_json::from_str(r#"{"name":"Yantras"}"#).unwrap();
        assert_eq!(keep.parent_id, None);

        let to_root: CategoryUpdate = serde_json::from_str(r#"{"parentId":null}"#).unwrap();
        assert_eq!(to_root.parent_id, Some(None));

        let id = Uuid::new_v4();
        let moved: CategoryUpdate =
            serde_json::from_str(&format!(r#"{{"parentId":"{id}"}}"#)).unwrap();
        assert_eq!(moved.parent_id, Some(Some(id)));
    }
}
