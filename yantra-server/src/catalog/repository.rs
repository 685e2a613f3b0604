//! Catalog storage seam
//!
//! Handlers talk to the catalog through this trait so the hierarchy and
//! listing logic can be exercised against an in-memory store.

use async_trait::async_trait;
use shared::models::{Category, ContentItem};
use sqlx::PgPool;
use uuid::Uuid;

use super::query::{ItemFilter, SortBy};
use crate::db;
use crate::error::{BoxError, ServiceResult};

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Every category, ordered by name
    async fn load_categories(&self) -> Result<Vec<Category>, BoxError>;

    async fn list_items(
        &self,
        filter: &ItemFilter,
        sort: SortBy,
    ) -> Result<Vec<ContentItem>, BoxError>;

    async fn find_item_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, BoxError>;

    async fn insert_category(&self, category: &Category) -> ServiceResult<Category>;

    async fn update_category(&self, category: &Category) -> ServiceResult<Category>;

    /// Returns false when the category did not exist
    async fn delete_category(&self, id: Uuid) -> ServiceResult<bool>;
}

#[async_trait]
impl CatalogRepository for PgPool {
    async fn load_categories(&self) -> Result<Vec<Category>, BoxError> {
        db::categories::list_all(self).await
    }

    async fn list_items(
        &self,
        filter: &ItemFilter,
        sort: SortBy,
    ) -> Result<Vec<ContentItem>, BoxError> {
        db::content::list(self, filter, sort).await
    }

    async fn find_item_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, BoxError> {
        db::content::find_by_slug(self, slug).await
    }

    async fn insert_category(&self, category: &Category) -> ServiceResult<Category> {
        db::categories::insert(self, category).await
    }

    async fn update_category(&self, category: &Category) -> ServiceResult<Category> {
        db::categories::update(self, category).await
    }

    async fn delete_category(&self, id: Uuid) -> ServiceResult<bool> {
        db::categories::delete(self, id).await
    }
}
