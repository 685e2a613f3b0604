//! Storefront catalog reads

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryNode, ContentItem};

use super::query::{ItemFilter, Listing, SortBy};
use super::repository::CatalogRepository;
use super::tree::CategoryTree;
use crate::error::ServiceResult;

/// Maximum results returned by the header search
pub const SEARCH_LIMIT: i64 = 10;

/// Category landing page: the category, its breadcrumbs and every
/// published item filed under it or any of its descendants
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPage {
    pub category: Category,
    pub breadcrumbs: Vec<Category>,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub product: ContentItem,
    /// Ancestry of the item's first category; empty when it has none
    pub breadcrumbs: Vec<Category>,
}

pub async fn load_tree<R: CatalogRepository + ?Sized>(repo: &R) -> ServiceResult<CategoryTree> {
    Ok(CategoryTree::new(repo.load_categories().await?))
}

pub async fn category_page<R: CatalogRepository + ?Sized>(
    repo: &R,
    path: &str,
    listing: &Listing,
) -> ServiceResult<CategoryPage> {
    if path.split('/').all(|s| s.trim().is_empty()) {
        return Err(AppError::new(ErrorCode::CategoryPathRequired).into());
    }

    let tree = load_tree(repo).await?;
    let category = tree.resolve_path(path).ok_or_else(|| {
        AppError::new(ErrorCode::CategoryNotFound).with_detail("path", path.to_string())
    })?;

    let filter = ItemFilter::storefront(listing).in_categories(tree.scope_ids(category.id));
    let items = repo.list_items(&filter, listing.sort).await?;

    tracing::debug!(
        category = %category.slug,
        scope = filter.category_ids.as_ref().map_or(0, Vec::len),
        items = items.len(),
        "Category page resolved"
    );

    Ok(CategoryPage {
        breadcrumbs: tree.ancestry(Some(category.id)).into_iter().cloned().collect(),
        category: category.clone(),
        items,
    })
}

/// Product page by slug. Unpublished items are not found.
///
/// Breadcrumbs are decoration: if the hierarchy cannot be loaded the page
/// is still served without them.
pub async fn product_page<R: CatalogRepository + ?Sized>(
    repo: &R,
    slug: &str,
) -> ServiceResult<ProductPage> {
    let product = repo
        .find_item_by_slug(slug)
        .await?
        .filter(|item| item.is_published)
        .ok_or_else(|| {
            AppError::new(ErrorCode::ProductNotFound).with_detail("slug", slug.to_string())
        })?;

    let breadcrumbs = match repo.load_categories().await {
        Ok(categories) => CategoryTree::new(categories)
            .ancestry(product.category_ids.first().copied())
            .into_iter()
            .cloned()
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, slug, "Failed to load categories for breadcrumbs");
            Vec::new()
        }
    };

    Ok(ProductPage {
        product,
        breadcrumbs,
    })
}

/// Every published item, optionally narrowed by availability and type
pub async fn list_products<R: CatalogRepository + ?Sized>(
    repo: &R,
    listing: &Listing,
) -> ServiceResult<Vec<ContentItem>> {
    let filter = ItemFilter::storefront(listing);
    Ok(repo.list_items(&filter, listing.sort).await?)
}

/// Name/description search over published items. A blank query finds nothing.
pub async fn search<R: CatalogRepository + ?Sized>(
    repo: &R,
    query: &str,
) -> ServiceResult<Vec<ContentItem>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let filter = ItemFilter {
        published_only: true,
        search: Some(query.to_string()),
        limit: Some(SEARCH_LIMIT),
        ..ItemFilter::default()
    };
    Ok(repo.list_items(&filter, SortBy::Newest).await?)
}

pub async fn category_tree<R: CatalogRepository + ?Sized>(
    repo: &R,
) -> ServiceResult<Vec<CategoryNode>> {
    Ok(load_tree(repo).await?.to_nested())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::MemoryCatalog;
    use crate::catalog::tree::tests::category;
    use crate::error::ServiceError;
    use rust_decimal::Decimal;

    fn code(err: ServiceError) -> ErrorCode {
        err.code().expect("business error")
    }

    #[tokio::test]
    async fn category_page_includes_descendant_items() {
        let yantras = category("yantras", None);
        let planetary = category("planetary", Some(yantras.id));
        let navgraha = category("navgraha-yantra", Some(planetary.id));
        let malas = category("malas", None);

        let catalog = MemoryCatalog::new(vec![
            yantras.clone(),
            planetary.clone(),
            navgraha.clone(),
            malas.clone(),
        ]);
        catalog.add_item("sri-yantra", 600, &[yantras.id], "In Stock");
        catalog.add_item("navgraha-gold", 1200, &[navgraha.id], "In Stock");
        catalog.add_item("tulsi-mala", 300, &[malas.id], "In Stock");

        let page = category_page(&catalog, "yantras", &Listing::default())
            .await
            .unwrap();
        let mut slugs: Vec<_> = page.items.iter().map(|i| i.slug.as_str()).collect();
        slugs.sort();
        assert_eq!(slugs, vec!["navgraha-gold", "sri-yantra"]);
        assert_eq!(page.breadcrumbs.len(), 1);

        let page = category_page(&catalog, "planetary/navgraha-yantra", &Listing::default())
            .await
            .unwrap();
        assert_eq!(page.category.id, navgraha.id);
        assert_eq!(
            page.breadcrumbs.iter().map(|c| c.slug.as_str()).collect::<Vec<_>>(),
            vec!["yantras", "planetary", "navgraha-yantra"]
        );
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].slug, "navgraha-gold");
    }

    #[tokio::test]
    async fn category_page_filters_availability_and_sorts_by_price() {
        let root = category("yantras", None);
        let catalog = MemoryCatalog::new(vec![root.clone()]);
        catalog.add_item("p1", 300, &[root.id], "In Stock");
        catalog.add_item("p2", 100, &[root.id], "Pre-order");
        catalog.add_item("p3", 200, &[root.id], "Out of Stock");

        let listing = Listing {
            sort: SortBy::PriceAsc,
            availability: vec!["In Stock".into(), "Pre-order".into()],
            item_type: None,
        };
        let page = category_page(&catalog, "yantras", &listing).await.unwrap();
        assert_eq!(
            page.items.iter().map(|i| i.slug.as_str()).collect::<Vec<_>>(),
            vec!["p2", "p1"]
        );

        let listing = Listing {
            sort: SortBy::PriceDesc,
            ..Listing::default()
        };
        let page = category_page(&catalog, "yantras", &listing).await.unwrap();
        assert_eq!(
            page.items.iter().map(|i| i.price).collect::<Vec<_>>(),
            vec![Decimal::from(300), Decimal::from(200), Decimal::from(100)]
        );
    }

    #[tokio::test]
    async fn unpublished_items_stay_hidden() {
        let root = category("yantras", None);
        let catalog = MemoryCatalog::new(vec![root.clone()]);
        catalog.add_item("visible", 100, &[root.id], "In Stock");
        let hidden = catalog.add_item("draft", 100, &[root.id], "In Stock");
        catalog.set_published(hidden, false);

        let page = category_page(&catalog, "yantras", &Listing::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);

        let err = product_page(&catalog, "draft").await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ProductNotFound);
    }

    #[tokio::test]
    async fn blank_and_unknown_paths_are_rejected() {
        let catalog = MemoryCatalog::new(vec![category("yantras", None)]);

        let err = category_page(&catalog, " / ", &Listing::default())
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::CategoryPathRequired);

        let err = category_page(&catalog, "malas", &Listing::default())
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::CategoryNotFound);
    }

    #[tokio::test]
    async fn product_page_breadcrumbs_follow_first_category() {
        let yantras = category("yantras", None);
        let navgraha = category("navgraha-yantra", Some(yantras.id));
        let gifts = category("gifts", None);
        let catalog = MemoryCatalog::new(vec![yantras.clone(), navgraha.clone(), gifts.clone()]);
        catalog.add_item("navgraha-gold", 1200, &[navgraha.id, gifts.id], "In Stock");
        catalog.add_item("loose", 50, &[], "In Stock");

        let page = product_page(&catalog, "navgraha-gold").await.unwrap();
        assert_eq!(
            page.breadcrumbs.iter().map(|c| c.slug.as_str()).collect::<Vec<_>>(),
            vec!["yantras", "navgraha-yantra"]
        );

        let page = product_page(&catalog, "loose").await.unwrap();
        assert!(page.breadcrumbs.is_empty());
    }

    #[tokio::test]
    async fn product_page_survives_category_load_failure() {
        let root = category("yantras", None);
        let catalog = MemoryCatalog::new(vec![root.clone()]);
        catalog.add_item("sri-yantra", 600, &[root.id], "In Stock");
        catalog.fail_category_loads();

        let page = product_page(&catalog, "sri-yantra").await.unwrap();
        assert_eq!(page.product.slug, "sri-yantra");
        assert!(page.breadcrumbs.is_empty());
    }

    #[tokio::test]
    async fn search_is_capped_and_ignores_blank_queries() {
        let root = category("yantras", None);
        let catalog = MemoryCatalog::new(vec![root.clone()]);
        for i in 0..15 {
            catalog.add_item(&format!("yantra-{i}"), 100 + i, &[root.id], "In Stock");
        }
        catalog.add_item("tulsi-mala", 300, &[root.id], "In Stock");

        assert_eq!(search(&catalog, "YANTRA").await.unwrap().len(), 10);
        assert_eq!(search(&catalog, "tulsi").await.unwrap().len(), 1);
        assert!(search(&catalog, "   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_tree_nests_children() {
        let root = category("yantras", None);
        let child = category("planetary", Some(root.id));
        let catalog = MemoryCatalog::new(vec![root, child]);

        let tree = category_tree(&catalog).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].category.slug, "planetary");
    }
}
