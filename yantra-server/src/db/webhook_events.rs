//! Processed webhook event ledger

use sqlx::PgPool;

use super::BoxError;

/// Record an event id. Returns false if it was already recorded.
///
/// Insert-first, so two concurrent deliveries of the same event cannot
/// both pass.
pub async fn record(pool: &PgPool, event_id: &str, event_type: &str) -> Result<bool, BoxError> {
    let result = sqlx::query(
        "INSERT INTO processed_webhook_events (event_id, event_type, processed_at)
         VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Forget an event so the provider's retry is processed again
pub async fn forget(pool: &PgPool, event_id: &str) -> Result<(), BoxError> {
    sqlx::query("DELETE FROM processed_webhook_events WHERE event_id = $1")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}
