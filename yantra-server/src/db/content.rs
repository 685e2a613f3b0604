//! Content item database operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{ContentItem, ContentType, Specification, Variant};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{BoxError, is_foreign_key_violation};
use crate::catalog::query::{ITEM_COLUMNS, ItemFilter, SortBy};
use crate::error::{ServiceError, ServiceResult, on_unique_violation};

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    content: Option<String>,
    price: Decimal,
    sale_price: Option<Decimal>,
    images: Json<Vec<String>>,
    #[sqlx(rename = "type")]
    item_type: ContentType,
    stock: i32,
    is_published: bool,
    availability: String,
    specifications: Json<Vec<Specification>>,
    benefits: Json<Vec<String>>,
    variants: Json<Vec<Variant>>,
    how_to_use: Json<Vec<String>>,
    package_contents: Json<Vec<String>>,
    category_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for ContentItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            content: row.content,
            price: row.price,
            sale_price: row.sale_price,
            images: row.images.0,
            item_type: row.item_type,
            stock: row.stock,
            is_published: row.is_published,
            availability: row.availability,
            specifications: row.specifications.0,
            benefits: row.benefits.0,
            variants: row.variants.0,
            how_to_use: row.how_to_use.0,
            package_contents: row.package_contents.0,
            category_ids: row.category_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &ItemFilter,
    sort: SortBy,
) -> Result<Vec<ContentItem>, BoxError> {
    let mut qb = QueryBuilder::<Postgres>::new("");
    filter.push_select(&mut qb, sort);
    let rows: Vec<ItemRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(ContentItem::from).collect())
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<ContentItem>, BoxError> {
    let row: Option<ItemRow> = sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM content_items ci WHERE ci.slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ContentItem::from))
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ContentItem>, BoxError> {
    let row: Option<ItemRow> = sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM content_items ci WHERE ci.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ContentItem::from))
}

pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<ContentItem>, BoxError> {
    let rows: Vec<ItemRow> = sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM content_items ci WHERE ci.id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ContentItem::from).collect())
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, BoxError> {
    let (found,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM content_items WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(found)
}

pub async fn insert(pool: &PgPool, item: &ContentItem) -> ServiceResult<ContentItem> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO content_items (
            id, name, slug, description, content, price, sale_price, images, type,
            stock, is_published, availability, specifications, benefits, variants,
            how_to_use, package_contents, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        "#,
    )
    .bind(item.id)
    .bind(&item.name)
    .bind(&item.slug)
    .bind(&item.description)
    .bind(&item.content)
    .bind(item.price)
    .bind(item.sale_price)
    .bind(Json(&item.images))
    .bind(item.item_type)
    .bind(item.stock)
    .bind(item.is_published)
    .bind(&item.availability)
    .bind(Json(&item.specifications))
    .bind(Json(&item.benefits))
    .bind(Json(&item.variants))
    .bind(Json(&item.how_to_use))
    .bind(Json(&item.package_contents))
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| on_unique_violation(e, AppError::new(ErrorCode::ProductSlugExists)))?;

    replace_categories(&mut tx, item.id, &item.category_ids).await?;
    tx.commit().await?;

    Ok(item.clone())
}

/// Overwrite every mutable column and the category links of an existing item
pub async fn update(pool: &PgPool, item: &ContentItem) -> ServiceResult<ContentItem> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE content_items
        SET name = $2, slug = $3, description = $4, content = $5, price = $6,
            sale_price = $7, images = $8, type = $9, stock = $10, is_published = $11,
            availability = $12, specifications = $13, benefits = $14, variants = $15,
            how_to_use = $16, package_contents = $17, updated_at = $18
        WHERE id = $1
        "#,
    )
    .bind(item.id)
    .bind(&item.name)
    .bind(&item.slug)
    .bind(&item.description)
    .bind(&item.content)
    .bind(item.price)
    .bind(item.sale_price)
    .bind(Json(&item.images))
    .bind(item.item_type)
    .bind(item.stock)
    .bind(item.is_published)
    .bind(&item.availability)
    .bind(Json(&item.specifications))
    .bind(Json(&item.benefits))
    .bind(Json(&item.variants))
    .bind(Json(&item.how_to_use))
    .bind(Json(&item.package_contents))
    .bind(item.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| on_unique_violation(e, AppError::new(ErrorCode::ProductSlugExists)))?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::ProductNotFound).into());
    }

    replace_categories(&mut tx, item.id, &item.category_ids).await?;
    tx.commit().await?;

    Ok(item.clone())
}

/// Delete an item. Returns false when it did not exist.
///
/// Items referenced by order lines cannot be deleted; unpublish them instead.
pub async fn delete(pool: &PgPool, id: Uuid) -> ServiceResult<bool> {
    match sqlx::query("DELETE FROM content_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
    {
        Ok(result) => Ok(result.rows_affected() > 0),
        Err(e) if is_foreign_key_violation(&e) => Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            "Item has been ordered; unpublish it instead",
        )
        .into()),
        Err(e) => Err(ServiceError::from(e)),
    }
}

async fn replace_categories(
    tx: &mut Transaction<'_, Postgres>,
    item_id: Uuid,
    category_ids: &[Uuid],
) -> ServiceResult<()> {
    sqlx::query("DELETE FROM content_item_categories WHERE content_item_id = $1")
        .bind(item_id)
        .execute(&mut **tx)
        .await?;

    if category_ids.is_empty() {
        return Ok(());
    }

    let positions: Vec<i32> = (0..category_ids.len() as i32).collect();
    sqlx::query(
        r#"
        INSERT INTO content_item_categories (content_item_id, category_id, position)
        SELECT $1, * FROM UNNEST($2::uuid[], $3::int[])
        "#,
    )
    .bind(item_id)
    .bind(category_ids)
    .bind(&positions)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            ServiceError::App(AppError::new(ErrorCode::CategoryNotFound))
        } else {
            ServiceError::from(e)
        }
    })?;
    Ok(())
}
