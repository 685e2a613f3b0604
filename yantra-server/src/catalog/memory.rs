//! In-memory catalog used by tests, with reviews and users alongside

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, ContentItem, ContentType, Review, UserUpsert};
use uuid::Uuid;

use super::query::{ItemFilter, SortBy};
use super::repository::CatalogRepository;
use super::tree::CategoryTree;
use crate::error::{BoxError, ServiceResult};
use crate::reviews::{NewReview, ReviewStore};

#[derive(Default)]
pub(crate) struct MemoryCatalog {
    categories: Mutex<Vec<Category>>,
    items: Mutex<Vec<ContentItem>>,
    /// `(external_id, local id)`
    users: Mutex<Vec<(String, Uuid)>>,
    reviews: Mutex<Vec<Review>>,
    fail_categories: AtomicBool,
}

impl MemoryCatalog {
    pub(crate) fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: Mutex::new(categories),
            ..Self::default()
        }
    }

    /// Add a published product; later additions are newer
    pub(crate) fn add_item(
        &self,
        slug: &str,
        price: i64,
        category_ids: &[Uuid],
        availability: &str,
    ) -> Uuid {
        let mut items = self.items.lock().unwrap();
        let created_at = Utc::now() + Duration::seconds(items.len() as i64);
        let item = ContentItem {
            id: Uuid::new_v4(),
            name: slug.replace('-', " "),
            slug: slug.to_string(),
            description: None,
            content: None,
            price: Decimal::from(price),
            sale_price: None,
            images: Vec::new(),
            item_type: ContentType::Product,
            stock: 10,
            is_published: true,
            availability: availability.to_string(),
            specifications: Vec::new(),
            benefits: Vec::new(),
            variants: Vec::new(),
            how_to_use: Vec::new(),
            package_contents: Vec::new(),
            category_ids: category_ids.to_vec(),
            created_at,
            updated_at: created_at,
        };
        let id = item.id;
        items.push(item);
        id
    }

    pub(crate) fn set_published(&self, id: Uuid, published: bool) {
        for item in self.items.lock().unwrap().iter_mut().filter(|i| i.id == id) {
            item.is_published = published;
        }
    }

    pub(crate) fn fail_category_loads(&self) {
        self.fail_categories.store(true, Ordering::SeqCst);
    }

    pub(crate) fn categories(&self) -> Vec<Category> {
        self.categories.lock().unwrap().clone()
    }

    /// External ids of users created so far
    pub(crate) fn users(&self) -> Vec<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .map(|(external_id, _)| external_id.clone())
            .collect()
    }

    pub(crate) fn reviews(&self) -> Vec<Review> {
        self.reviews.lock().unwrap().clone()
    }
}

fn matches(filter: &ItemFilter, item: &ContentItem) -> bool {
    let in_scope = filter
        .category_ids
        .as_ref()
        .is_none_or(|ids| item.category_ids.iter().any(|c| ids.contains(c)));
    let available =
        filter.availability.is_empty() || filter.availability.contains(&item.availability);
    let published = !filter.published_only || item.is_published;
    let typed = filter.item_type.is_none_or(|t| t == item.item_type);
    let found = filter.search.as_ref().is_none_or(|term| {
        let term = term.to_lowercase();
        item.name.to_lowercase().contains(&term)
            || item
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    });
    in_scope && available && published && typed && found
}

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn load_categories(&self) -> Result<Vec<Category>, BoxError> {
        if self.fail_categories.load(Ordering::SeqCst) {
            return Err("category store unavailable".into());
        }
        Ok(self.categories())
    }

    async fn list_items(
        &self,
        filter: &ItemFilter,
        sort: SortBy,
    ) -> Result<Vec<ContentItem>, BoxError> {
        let mut found: Vec<ContentItem> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| matches(filter, item))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            let newest = b.created_at.cmp(&a.created_at);
            match sort {
                SortBy::Newest => newest,
                SortBy::PriceAsc => a.price.cmp(&b.price).then(newest),
                SortBy::PriceDesc => b.price.cmp(&a.price).then(newest),
            }
        });
        if let Some(limit) = filter.limit {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn find_item_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, BoxError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.slug == slug)
            .cloned())
    }

    async fn insert_category(&self, category: &Category) -> ServiceResult<Category> {
        self.categories.lock().unwrap().push(category.clone());
        Ok(category.clone())
    }

    async fn update_category(&self, category: &Category) -> ServiceResult<Category> {
        let mut categories = self.categories.lock().unwrap();
        if let Some(parent_id) = category.parent_id
            && CategoryTree::new(categories.clone()).would_create_cycle(category.id, parent_id)
        {
            return Err(AppError::new(ErrorCode::CategoryCycle)
                .with_detail("parentId", parent_id.to_string())
                .into());
        }
        let existing = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
        *existing = category.clone();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> ServiceResult<bool> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        Ok(categories.len() < before)
    }
}

#[async_trait]
impl ReviewStore for MemoryCatalog {
    async fn product_exists(&self, id: Uuid) -> Result<bool, BoxError> {
        Ok(self.items.lock().unwrap().iter().any(|i| i.id == id))
    }

    async fn upsert_user(&self, user: &UserUpsert) -> ServiceResult<Uuid> {
        let mut users = self.users.lock().unwrap();
        if let Some((_, id)) = users.iter().find(|(ext, _)| *ext == user.external_id) {
            return Ok(*id);
        }
        let id = Uuid::new_v4();
        users.push((user.external_id.clone(), id));
        Ok(id)
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, BoxError> {
        let now = Utc::now();
        let row = Review {
            id: Uuid::new_v4(),
            content_item_id: review.content_item_id,
            rating: review.rating,
            comment: review.comment.clone(),
            image_url: review.image_url.clone(),
            is_approved: review.is_approved,
            user_id: review.user_id,
            guest_name: review.guest_name.clone(),
            guest_email: review.guest_email.clone(),
            approved_at: review.is_approved.then_some(now),
            approved_by: None,
            created_at: now,
        };
        self.reviews.lock().unwrap().push(row.clone());
        Ok(row)
    }
}
