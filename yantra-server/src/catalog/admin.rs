//! Catalog administration: category CRUD and content item preparation

use chrono::Utc;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, ContentItem, ContentItemCreate, ContentItemUpdate,
    DEFAULT_AVAILABILITY, sale_price_is_valid,
};
use shared::util::slugify;
use uuid::Uuid;
use validator::Validate;

use super::repository::CatalogRepository;
use super::service::load_tree;
use super::tree::CategoryTree;
use crate::error::ServiceResult;

fn resolve_slug(explicit: Option<&str>, name: &str) -> Result<String, AppError> {
    let slug = slugify(explicit.unwrap_or(name));
    if slug.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            "Slug must contain at least one letter or digit",
        ));
    }
    Ok(slug)
}

fn ensure_parent_exists(tree: &CategoryTree, parent: Option<Uuid>) -> Result<(), AppError> {
    match parent {
        Some(id) if !tree.contains(id) => Err(AppError::with_message(
            ErrorCode::CategoryNotFound,
            "Parent category not found",
        )
        .with_detail("parentId", id.to_string())),
        _ => Ok(()),
    }
}

pub async fn create_category<R: CatalogRepository + ?Sized>(
    repo: &R,
    data: CategoryCreate,
) -> ServiceResult<Category> {
    data.validate()?;
    let slug = resolve_slug(data.slug.as_deref(), &data.name)?;

    let tree = load_tree(repo).await?;
    ensure_parent_exists(&tree, data.parent_id)?;
    if tree.sibling_slug_taken(data.parent_id, &slug, None) {
        return Err(AppError::new(ErrorCode::CategorySlugExists)
            .with_detail("slug", slug)
            .into());
    }

    let now = Utc::now();
    let category = Category {
        id: Uuid::new_v4(),
        name: data.name.trim().to_string(),
        slug,
        description: data.description,
        image: data.image,
        category_type: data.category_type,
        parent_id: data.parent_id,
        created_at: now,
        updated_at: now,
    };
    let created = repo.insert_category(&category).await?;
    tracing::info!(category_id = %created.id, slug = %created.slug, "Category created");
    Ok(created)
}

pub async fn update_category<R: CatalogRepository + ?Sized>(
    repo: &R,
    id: Uuid,
    data: CategoryUpdate,
) -> ServiceResult<Category> {
    data.validate()?;

    let tree = load_tree(repo).await?;
    let mut category = tree
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;

    if let Some(parent) = data.parent_id {
        ensure_parent_exists(&tree, parent)?;
        if let Some(new_parent) = parent
            && tree.would_create_cycle(id, new_parent)
        {
            return Err(AppError::new(ErrorCode::CategoryCycle)
                .with_detail("parentId", new_parent.to_string())
                .into());
        }
        category.parent_id = parent;
    }
    if let Some(name) = data.name {
        category.name = name.trim().to_string();
    }
    if let Some(slug) = data.slug.as_deref() {
        category.slug = resolve_slug(Some(slug), &category.name)?;
    }
    if tree.sibling_slug_taken(category.parent_id, &category.slug, Some(id)) {
        return Err(AppError::new(ErrorCode::CategorySlugExists)
            .with_detail("slug", category.slug)
            .into());
    }
    if let Some(description) = data.description {
        category.description = Some(description);
    }
    if let Some(image) = data.image {
        category.image = Some(image);
    }
    if let Some(category_type) = data.category_type {
        category.category_type = category_type;
    }
    category.updated_at = Utc::now();

    let updated = repo.update_category(&category).await?;
    tracing::info!(category_id = %id, "Category updated");
    Ok(updated)
}

/// Delete a leaf category. Categories with children are refused.
pub async fn delete_category<R: CatalogRepository + ?Sized>(repo: &R, id: Uuid) -> ServiceResult<()> {
    let tree = load_tree(repo).await?;
    if !tree.contains(id) {
        return Err(AppError::new(ErrorCode::CategoryNotFound).into());
    }
    if tree.has_children(id) {
        return Err(AppError::new(ErrorCode::CategoryHasChildren).into());
    }
    if !repo.delete_category(id).await? {
        return Err(AppError::new(ErrorCode::CategoryNotFound).into());
    }
    tracing::info!(category_id = %id, "Category deleted");
    Ok(())
}

fn check_prices(item: &ContentItem) -> Result<(), AppError> {
    if item.price < rust_decimal::Decimal::ZERO || !sale_price_is_valid(item.price, item.sale_price)
    {
        return Err(AppError::new(ErrorCode::ProductInvalidPrice)
            .with_detail("price", item.price.to_string()));
    }
    for variant in &item.variants {
        let price = variant.price.unwrap_or(item.price);
        if price < rust_decimal::Decimal::ZERO || !sale_price_is_valid(price, variant.sale_price) {
            return Err(AppError::new(ErrorCode::ProductInvalidPrice)
                .with_detail("variant", variant.name.clone()));
        }
    }
    Ok(())
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Build a new item from a create payload, enforcing price and slug rules
pub fn prepare_item(data: ContentItemCreate) -> Result<ContentItem, AppError> {
    data.validate()?;
    let now = Utc::now();
    let item = ContentItem {
        id: Uuid::new_v4(),
        slug: resolve_slug(data.slug.as_deref(), &data.name)?,
        name: data.name.trim().to_string(),
        description: data.description,
        content: data.content,
        price: data.price,
        sale_price: data.sale_price,
        images: data.images,
        item_type: data.item_type,
        stock: data.stock,
        is_published: data.is_published,
        availability: data
            .availability
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AVAILABILITY.to_string()),
        specifications: data.specifications,
        benefits: data.benefits,
        variants: data.variants,
        how_to_use: data.how_to_use,
        package_contents: data.package_contents,
        category_ids: dedup(data.category_ids),
        created_at: now,
        updated_at: now,
    };
    check_prices(&item)?;
    Ok(item)
}

/// Apply a partial update to an existing item, re-checking the price rules
/// against the merged result
pub fn apply_item_update(
    mut item: ContentItem,
    data: ContentItemUpdate,
) -> Result<ContentItem, AppError> {
    data.validate()?;

    if let Some(name) = data.name {
        item.name = name.trim().to_string();
    }
    if let Some(slug) = data.slug.as_deref() {
        item.slug = resolve_slug(Some(slug), &item.name)?;
    }
    if data.description.is_some() {
        item.description = data.description;
    }
    if data.content.is_some() {
        item.content = data.content;
    }
    if let Some(price) = data.price {
        item.price = price;
    }
    if let Some(sale_price) = data.sale_price {
        item.sale_price = sale_price;
    }
    if let Some(images) = data.images {
        item.images = images;
    }
    if let Some(item_type) = data.item_type {
        item.item_type = item_type;
    }
    if let Some(stock) = data.stock {
        item.stock = stock;
    }
    if let Some(published) = data.is_published {
        item.is_published = published;
    }
    if let Some(availability) = data.availability.filter(|a| !a.trim().is_empty()) {
        item.availability = availability;
    }
    if let Some(specifications) = data.specifications {
        item.specifications = specifications;
    }
    if let Some(benefits) = data.benefits {
        item.benefits = benefits;
    }
    if let Some(variants) = data.variants {
        item.variants = variants;
    }
    if let Some(how_to_use) = data.how_to_use {
        item.how_to_use = how_to_use;
    }
    if let Some(package_contents) = data.package_contents {
        item.package_contents = package_contents;
    }
    if let Some(category_ids) = data.category_ids {
        item.category_ids = dedup(category_ids);
    }
    item.updated_at = Utc::now();

    check_prices(&item)?;
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::MemoryCatalog;
    use crate::catalog::tree::tests::category;
    use rust_decimal::Decimal;
    use shared::models::{ContentType, Variant};

    fn create(name: &str, parent_id: Option<Uuid>) -> CategoryCreate {
        CategoryCreate {
            name: name.to_string(),
            slug: None,
            description: None,
            image: None,
            category_type: ContentType::Product,
            parent_id,
        }
    }

    #[tokio::test]
    async fn create_derives_slug_and_checks_siblings() {
        let catalog = MemoryCatalog::new(Vec::new());
        let root = create_category(&catalog, create("Navgraha Yantra", None))
            .await
            .unwrap();
        assert_eq!(root.slug, "navgraha-yantra");

        let err = create_category(&catalog, create("Navgraha  Yantra!", None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CategorySlugExists));

        // Same slug under a different parent is fine
        let child = create_category(&catalog, create("Navgraha Yantra", Some(root.id)))
            .await
            .unwrap();
        assert_eq!(child.parent_id, Some(root.id));
    }

    #[tokio::test]
    async fn create_rejects_unknown_parent_and_empty_slug() {
        let catalog = MemoryCatalog::new(Vec::new());
        let err = create_category(&catalog, create("Orphan", Some(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CategoryNotFound));

        let err = create_category(&catalog, create("!!!", None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidFormat));
    }

    #[tokio::test]
    async fn reparenting_under_a_descendant_is_refused() {
        let root = category("root", None);
        let child = category("child", Some(root.id));
        let grandchild = category("grandchild", Some(child.id));
        let (root_id, gc_id) = (root.id, grandchild.id);
        let catalog = MemoryCatalog::new(vec![root, child, grandchild]);

        let update = CategoryUpdate {
            parent_id: Some(Some(gc_id)),
            ..CategoryUpdate::default()
        };
        let err = update_category(&catalog, root_id, update).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CategoryCycle));

        // Moving the grandchild to the root level is allowed
        let update = CategoryUpdate {
            parent_id: Some(None),
            ..CategoryUpdate::default()
        };
        let moved = update_category(&catalog, gc_id, update).await.unwrap();
        assert_eq!(moved.parent_id, None);
    }

    #[tokio::test]
    async fn concurrent_moves_cannot_close_a_loop() {
        let a = category("a", None);
        let b = category("b", None);
        let (a_id, b_id) = (a.id, b.id);
        let catalog = MemoryCatalog::new(vec![a, b.clone()]);

        // Both moves were validated against the same snapshot; the first wins
        let update = CategoryUpdate {
            parent_id: Some(Some(b_id)),
            ..CategoryUpdate::default()
        };
        update_category(&catalog, a_id, update).await.unwrap();

        let mut stale = b;
        stale.parent_id = Some(a_id);
        let err = catalog.update_category(&stale).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CategoryCycle));

        let current = catalog.categories();
        let b_now = current.iter().find(|c| c.id == b_id).unwrap();
        assert_eq!(b_now.parent_id, None);
    }

    #[tokio::test]
    async fn delete_refuses_categories_with_children() {
        let root = category("root", None);
        let child = category("child", Some(root.id));
        let (root_id, child_id) = (root.id, child.id);
        let catalog = MemoryCatalog::new(vec![root, child]);

        let err = delete_category(&catalog, root_id).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CategoryHasChildren));

        delete_category(&catalog, child_id).await.unwrap();
        delete_category(&catalog, root_id).await.unwrap();
        assert!(catalog.categories().is_empty());

        let err = delete_category(&catalog, root_id).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CategoryNotFound));
    }

    fn item_payload() -> ContentItemCreate {
        serde_json::from_value(serde_json::json!({
            "name": "Sri Yantra",
            "price": 600,
            "salePrice": 450,
            "categoryIds": [],
        }))
        .unwrap()
    }

    #[test]
    fn prepare_item_applies_defaults() {
        let item = prepare_item(item_payload()).unwrap();
        assert_eq!(item.slug, "sri-yantra");
        assert_eq!(item.availability, DEFAULT_AVAILABILITY);
        assert_eq!(item.item_type, ContentType::Product);
    }

    #[test]
    fn prepare_item_rejects_sale_price_above_price() {
        let mut payload = item_payload();
        payload.sale_price = Some(Decimal::from(700));
        let err = prepare_item(payload).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);

        let mut payload = item_payload();
        payload.variants = vec![Variant {
            name: "Gold".into(),
            price: Some(Decimal::from(500)),
            sale_price: Some(Decimal::from(550)),
            stock: None,
        }];
        let err = prepare_item(payload).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
    }

    #[test]
    fn update_rechecks_merged_prices() {
        let item = prepare_item(item_payload()).unwrap();

        // Dropping the price below the existing sale price is refused
        let update = ContentItemUpdate {
            price: Some(Decimal::from(400)),
            ..ContentItemUpdate::default()
        };
        assert!(apply_item_update(item.clone(), update).is_err());

        // ...unless the sale price is cleared in the same request
        let update: ContentItemUpdate =
            serde_json::from_str(r#"{"price":400,"salePrice":null}"#).unwrap();
        let updated = apply_item_update(item, update).unwrap();
        assert_eq!(updated.price, Decimal::from(400));
        assert_eq!(updated.sale_price, None);
    }
}
