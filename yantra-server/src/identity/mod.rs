//! Identity-provider webhooks
//!
//! Deliveries are signed Svix-style: `svix-id`, `svix-timestamp` and
//! `svix-signature` headers, HMAC-SHA256 over `{id}.{timestamp}.{body}`
//! with the base64 secret that follows the `whsec_` prefix.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use shared::models::UserUpsert;

/// Maximum clock skew accepted on a delivery, in seconds
const TOLERANCE_SECS: i64 = 300;

/// Signature headers of one delivery
#[derive(Debug, Clone, Copy)]
pub struct SignedDelivery<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    /// Space-separated `v1,<base64>` entries
    pub signatures: &'a str,
}

/// Verify a delivery against the endpoint secret at time `now` (Unix seconds)
pub fn verify_webhook_signature(
    delivery: SignedDelivery<'_>,
    payload: &[u8],
    secret: &str,
    now: i64,
) -> Result<(), &'static str> {
    if delivery.id.is_empty() || delivery.timestamp.is_empty() || delivery.signatures.is_empty() {
        return Err("Missing signature headers");
    }

    let ts: i64 = delivery.timestamp.parse().map_err(|_| "Invalid timestamp")?;
    if (now - ts).abs() > TOLERANCE_SECS {
        return Err("Webhook timestamp outside tolerance");
    }

    let key = BASE64
        .decode(secret.strip_prefix("whsec_").unwrap_or(secret))
        .map_err(|_| "Invalid webhook secret")?;
    let mut mac = Hmac::<Sha256>::new_from_slice(&key).map_err(|_| "HMAC key error")?;
    mac.update(delivery.id.as_bytes());
    mac.update(b".");
    mac.update(delivery.timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Any listed v1 signature may match (secret rotation sends several)
    let matched = delivery
        .signatures
        .split_whitespace()
        .filter_map(|entry| entry.strip_prefix("v1,"))
        .filter_map(|sig| BASE64.decode(sig).ok())
        .any(|sig| mac.clone().verify_slice(&sig).is_ok());

    if matched {
        Ok(())
    } else {
        Err("Webhook signature mismatch")
    }
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    id: String,
    email_address: String,
}

/// Provider user payload (`user.created` / `user.updated`)
#[derive(Debug, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    primary_email_address_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
}

impl ProviderUser {
    /// Primary address, falling back to the first listed one
    pub fn primary_email(&self) -> Option<&str> {
        let primary = self.primary_email_address_id.as_deref();
        self.email_addresses
            .iter()
            .find(|e| Some(e.id.as_str()) == primary)
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.as_str())
    }

    pub fn display_name(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!name.is_empty()).then_some(name)
    }

    /// Local user fields; None when the provider sent no email at all
    pub fn to_upsert(&self) -> Option<UserUpsert> {
        Some(UserUpsert {
            external_id: self.id.clone(),
            email: self.primary_email()?.to_lowercase(),
            name: self.display_name(),
            image_url: self.image_url.clone().filter(|u| !u.is_empty()),
        })
    }
}

/// `user.deleted` payload
#[derive(Debug, Deserialize)]
pub struct DeletedUser {
    pub id: Option<String>,
}

/// What a webhook event asks of the local user table
#[derive(Debug)]
pub enum IdentityChange {
    Upsert(ProviderUser),
    Delete(DeletedUser),
    Ignored,
}

impl WebhookEvent {
    /// Decode `data` for the event types that touch local users
    pub fn into_change(self) -> Result<IdentityChange, serde_json::Error> {
        match self.event_type.as_str() {
            "user.created" | "user.updated" => {
                serde_json::from_value(self.data).map(IdentityChange::Upsert)
            }
            "user.deleted" => serde_json::from_value(self.data).map(IdentityChange::Delete),
            _ => Ok(IdentityChange::Ignored),
        }
    }
}
