//! Category database operations

use shared::error::{AppError, ErrorCode};
use shared::models::Category;
use sqlx::PgPool;
use uuid::Uuid;

use super::{BoxError, is_foreign_key_violation};
use crate::error::{ServiceError, ServiceResult, on_unique_violation};

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, image, type, parent_id, created_at, updated_at";

pub async fn list_all(pool: &PgPool) -> Result<Vec<Category>, BoxError> {
    let rows = sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn insert(pool: &PgPool, category: &Category) -> ServiceResult<Category> {
    sqlx::query_as::<_, Category>(&format!(
        r#"
        INSERT INTO categories (id, name, slug, description, image, type, parent_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {CATEGORY_COLUMNS}
        "#
    ))
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.image)
    .bind(category.category_type)
    .bind(category.parent_id)
    .bind(category.created_at)
    .bind(category.updated_at)
    .fetch_one(pool)
    .await
    .map_err(|e| on_unique_violation(e, AppError::new(ErrorCode::CategorySlugExists)))
}

/// True when `id` is `parent` itself or one of its ancestors
const IS_ANCESTOR_SQL: &str = r#"
    WITH RECURSIVE ancestors AS (
        SELECT id, parent_id FROM categories WHERE id = $2
        UNION
        SELECT c.id, c.parent_id FROM categories c JOIN ancestors a ON c.id = a.parent_id
    )
    SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $1)
"#;

/// Overwrite every mutable column of an existing category
///
/// A move under a new parent takes a self-conflicting table lock and checks
/// the ancestry again inside the transaction, so two concurrent moves cannot
/// close a loop. Plain reads are not blocked.
pub async fn update(pool: &PgPool, category: &Category) -> ServiceResult<Category> {
    let mut tx = pool.begin().await?;

    if let Some(parent_id) = category.parent_id {
        sqlx::query("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let cycle: bool = sqlx::query_scalar(IS_ANCESTOR_SQL)
            .bind(category.id)
            .bind(parent_id)
            .fetch_one(&mut *tx)
            .await?;
        if cycle {
            return Err(AppError::new(ErrorCode::CategoryCycle)
                .with_detail("parentId", parent_id.to_string())
                .into());
        }
    }

    let row = sqlx::query_as::<_, Category>(&format!(
        r#"
        UPDATE categories
        SET name = $2, slug = $3, description = $4, image = $5, type = $6,
            parent_id = $7, updated_at = $8
        WHERE id = $1
        RETURNING {CATEGORY_COLUMNS}
        "#
    ))
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.image)
    .bind(category.category_type)
    .bind(category.parent_id)
    .bind(category.updated_at)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| on_unique_violation(e, AppError::new(ErrorCode::CategorySlugExists)))?;

    let Some(row) = row else {
        return Err(AppError::new(ErrorCode::CategoryNotFound).into());
    };
    tx.commit().await?;
    Ok(row)
}

/// Delete a category. Returns false when it did not exist.
///
/// Children reference their parent with `ON DELETE RESTRICT`; a child
/// inserted concurrently still blocks the delete here.
pub async fn delete(pool: &PgPool, id: Uuid) -> ServiceResult<bool> {
    match sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
    {
        Ok(result) => Ok(result.rows_affected() > 0),
        Err(e) if is_foreign_key_violation(&e) => {
            Err(AppError::new(ErrorCode::CategoryHasChildren).into())
        }
        Err(e) => Err(ServiceError::from(e)),
    }
}
