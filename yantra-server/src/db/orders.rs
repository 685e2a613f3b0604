//! Order database operations

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderItem, OrderStatus};
use sqlx::PgPool;
use uuid::Uuid;

use super::BoxError;
use crate::error::ServiceResult;
use crate::orders::NewOrder;

const ORDER_COLUMNS: &str = "id, user_id, subtotal, shipping, total, status, customer_name, \
     customer_phone, customer_email, shipping_address, created_at";

/// Persist an order with its lines, reserving stock in the same transaction.
///
/// Stock is decremented with a conditional update per tracked line; if any
/// line cannot be covered the whole order rolls back with `ProductOutOfStock`.
pub async fn insert(pool: &PgPool, order: &NewOrder) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    for line in order.lines.iter().filter(|l| l.reserve_stock) {
        let reserved = sqlx::query(
            "UPDATE content_items SET stock = stock - $2, updated_at = NOW() \
             WHERE id = $1 AND stock >= $2",
        )
        .bind(line.content_item_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::with_message(
                ErrorCode::ProductOutOfStock,
                format!("Not enough stock for {}", line.name),
            )
            .with_detail("productId", line.content_item_id.to_string())
            .into());
        }
    }

    let mut created = sqlx::query_as::<_, Order>(&format!(
        r#"
        INSERT INTO orders (
            id, user_id, subtotal, shipping, total, status,
            customer_name, customer_phone, customer_email, shipping_address, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.subtotal)
    .bind(order.shipping)
    .bind(order.total)
    .bind(OrderStatus::Pending)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(&order.customer_email)
    .bind(&order.shipping_address)
    .fetch_one(&mut *tx)
    .await?;

    for line in &order.lines {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (id, order_id, content_item_id, name, variant, energized, quantity, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, order_id, content_item_id, name, variant, energized, quantity, price
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(line.content_item_id)
        .bind(&line.name)
        .bind(&line.variant)
        .bind(line.energized)
        .bind(line.quantity)
        .bind(line.unit_price)
        .fetch_one(&mut *tx)
        .await?;
        created.items.push(item);
    }

    tx.commit().await?;
    Ok(created)
}

/// Orders placed by one user, newest first, with their lines
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Order>, BoxError> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    attach_items(pool, orders).await
}

/// All orders, newest first, for the admin dashboard
pub async fn list_all(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Order>, BoxError> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    attach_items(pool, orders).await
}

async fn attach_items(pool: &PgPool, mut orders: Vec<Order>) -> Result<Vec<Order>, BoxError> {
    if orders.is_empty() {
        return Ok(orders);
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, content_item_id, name, variant, energized, quantity, price \
         FROM order_items WHERE order_id = ANY($1) ORDER BY order_id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    for order in &mut orders {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
}
