//! Catalog listing filters and SQL generation

use serde::Deserialize;
use shared::models::ContentType;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// Columns selected for a content item, category ids aggregated in position order
pub const ITEM_COLUMNS: &str = r#"
    ci.id, ci.name, ci.slug, ci.description, ci.content, ci.price, ci.sale_price,
    ci.images, ci.type, ci.stock, ci.is_published, ci.availability,
    ci.specifications, ci.benefits, ci.variants, ci.how_to_use, ci.package_contents,
    COALESCE(
        (SELECT array_agg(cic.category_id ORDER BY cic.position)
         FROM content_item_categories cic WHERE cic.content_item_id = ci.id),
        '{}'::uuid[]
    ) AS category_ids,
    ci.created_at, ci.updated_at
"#;

/// Listing sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Newest first
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortBy {
    /// Parse the `sortBy` query value; anything unrecognized means newest first
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("price-asc") => SortBy::PriceAsc,
            Some("price-desc") => SortBy::PriceDesc,
            _ => SortBy::Newest,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            SortBy::Newest => " ORDER BY ci.created_at DESC, ci.id",
            SortBy::PriceAsc => " ORDER BY ci.price ASC, ci.created_at DESC, ci.id",
            SortBy::PriceDesc => " ORDER BY ci.price DESC, ci.created_at DESC, ci.id",
        }
    }
}

/// Raw listing query string (`?sortBy=price-asc&availability=In Stock,Pre-order`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub sort_by: Option<String>,
    pub availability: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<ContentType>,
}

/// Parsed listing options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub sort: SortBy,
    /// Empty means no availability filter
    pub availability: Vec<String>,
    pub item_type: Option<ContentType>,
}

impl From<ListingParams> for Listing {
    fn from(params: ListingParams) -> Self {
        Self {
            sort: SortBy::parse(params.sort_by.as_deref()),
            availability: params
                .availability
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            item_type: params.item_type,
        }
    }
}

/// Content item filter; unset fields do not constrain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    /// Items linked to any of these categories
    pub category_ids: Option<Vec<Uuid>>,
    pub availability: Vec<String>,
    pub published_only: bool,
    pub item_type: Option<ContentType>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl ItemFilter {
    /// Filter for public listings: published items only
    pub fn storefront(listing: &Listing) -> Self {
        Self {
            availability: listing.availability.clone(),
            published_only: true,
            item_type: listing.item_type,
            ..Self::default()
        }
    }

    pub fn in_categories(mut self, ids: Vec<Uuid>) -> Self {
        self.category_ids = Some(ids);
        self
    }

    /// Append `SELECT ... WHERE ... ORDER BY ... [LIMIT]` for this filter
    pub fn push_select<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, sort: SortBy) {
        qb.push("SELECT ");
        qb.push(ITEM_COLUMNS);
        qb.push(" FROM content_items ci WHERE TRUE");

        if let Some(ids) = &self.category_ids {
            qb.push(
                " AND EXISTS (SELECT 1 FROM content_item_categories f \
                 WHERE f.content_item_id = ci.id AND f.category_id = ANY(",
            );
            qb.push_bind(ids.clone());
            qb.push("))");
        }
        if !self.availability.is_empty() {
            qb.push(" AND ci.availability = ANY(");
            qb.push_bind(self.availability.clone());
            qb.push(")");
        }
        if self.published_only {
            qb.push(" AND ci.is_published");
        }
        if let Some(item_type) = self.item_type {
            qb.push(" AND ci.type = ");
            qb.push_bind(item_type);
        }
        if let Some(term) = &self.search {
            let pattern = format!("%{}%", escape_like(term));
            qb.push(" AND (ci.name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR ci.description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        qb.push(sort.order_clause());

        if let Some(limit) = self.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }
    }
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
