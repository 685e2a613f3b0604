//! Identity-provider webhook handler
//!
//! POST /api/webhooks/identity keeps the local user table in step with
//! the provider (raw body for signature verification)

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::db;
use crate::identity::{
    DeletedUser, IdentityChange, ProviderUser, SignedDelivery, WebhookEvent,
    verify_webhook_signature,
};
use crate::state::AppState;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Handle incoming identity-provider events
pub async fn handle_identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    // 1. Verify signature
    let delivery = SignedDelivery {
        id: header(&headers, "svix-id"),
        timestamp: header(&headers, "svix-timestamp"),
        signatures: header(&headers, "svix-signature"),
    };
    if let Err(e) = verify_webhook_signature(
        delivery,
        &body,
        &state.identity_webhook_secret,
        chrono::Utc::now().timestamp(),
    ) {
        tracing::warn!(error = e, "Identity webhook verification failed");
        return StatusCode::UNAUTHORIZED;
    }

    // 2. Parse the event and its payload; nothing is recorded for a malformed delivery
    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse identity webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };
    let event_type = event.event_type.clone();
    tracing::info!(event_type = %event_type, delivery_id = delivery.id, "Received identity webhook");
    let change = match event.into_change() {
        Ok(change) => change,
        Err(e) => {
            tracing::warn!(%e, event_type = %event_type, "Malformed identity webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    // 3. Idempotency: INSERT first, check rows_affected
    match db::webhook_events::record(&state.pool, delivery.id, &event_type).await {
        Ok(false) => {
            tracing::info!(delivery_id = delivery.id, "Duplicate webhook delivery, skipping");
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::error!(%e, "DB error recording webhook event");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        Ok(true) => {} // New event, proceed
    }

    // 4. Apply the change
    let status = match change {
        IdentityChange::Upsert(user) => handle_user_upsert(&state, user).await,
        IdentityChange::Delete(deleted) => handle_user_deleted(&state, deleted).await,
        IdentityChange::Ignored => {
            tracing::debug!(event_type = %event_type, "Unhandled identity webhook event type");
            StatusCode::OK
        }
    };

    // Let the provider retry a failed delivery
    if status.is_server_error()
        && let Err(e) = db::webhook_events::forget(&state.pool, delivery.id).await
    {
        tracing::error!(%e, "Failed to release webhook event for retry");
    }
    status
}

async fn handle_user_upsert(state: &AppState, user: ProviderUser) -> StatusCode {
    let Some(upsert) = user.to_upsert() else {
        tracing::warn!(external_id = %user.id, "Provider user has no email, skipping");
        return StatusCode::OK;
    };

    match db::users::upsert(&state.pool, &upsert).await {
        Ok(saved) => {
            tracing::info!(user_id = %saved.id, external_id = %saved.external_id, "User synchronized");
            StatusCode::OK
        }
        Err(e) => {
            let err = shared::error::AppError::from(e);
            if err.http_status().is_server_error() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                tracing::warn!(external_id = %upsert.external_id, code = %err.code, "User sync rejected");
                StatusCode::OK
            }
        }
    }
}

async fn handle_user_deleted(state: &AppState, deleted: DeletedUser) -> StatusCode {
    let Some(external_id) = deleted.id else {
        tracing::warn!("user.deleted without id");
        return StatusCode::OK;
    };

    match db::users::delete_by_external_id(&state.pool, &external_id).await {
        Ok(removed) => {
            tracing::info!(external_id = %external_id, removed, "User deleted");
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(%e, "Failed to delete user");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
