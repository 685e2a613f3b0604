//! Razorpay integration via REST API (no SDK dependency)

use hmac::{Hmac, Mac};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::BoxError;

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";
const CURRENCY: &str = "INR";

/// Gateway credentials
#[derive(Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
}

/// Gateway order as returned to the browser checkout widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrder {
    pub id: String,
    /// Minor units (paise)
    pub amount: i64,
    pub currency: String,
    /// Public key id the widget needs
    pub key_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

/// Convert a rupee amount to paise. Non-positive or unrepresentable amounts are refused.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    if amount <= Decimal::ZERO {
        return None;
    }
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

impl RazorpayClient {
    pub fn new(http: reqwest::Client, key_id: String, key_secret: String) -> Self {
        Self {
            http,
            key_id,
            key_secret,
        }
    }

    /// Create a gateway order for `amount_paise`
    pub async fn create_order(
        &self,
        amount_paise: i64,
        receipt: &str,
    ) -> Result<GatewayOrder, BoxError> {
        let resp = self
            .http
            .post(ORDERS_URL)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&serde_json::json!({
                "amount": amount_paise,
                "currency": CURRENCY,
                "receipt": receipt,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(format!("Razorpay create_order failed ({status}): {detail}").into());
        }

        let created: CreateOrderResponse = resp.json().await?;
        Ok(GatewayOrder {
            id: created.id,
            amount: created.amount,
            currency: created.currency,
            key_id: self.key_id.clone(),
        })
    }

    pub fn verify_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), &'static str> {
        verify_payment_signature(order_id, payment_id, signature, &self.key_secret)
    }
}

/// Verify the checkout signature: hex HMAC-SHA256 of `order_id|payment_id`
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> Result<(), &'static str> {
    if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
        return Err("Missing payment fields");
    }

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    // Decode hex signature and use constant-time comparison via hmac::verify_slice
    let sig_bytes = hex::decode(signature).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Payment signature mismatch")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_genuine_signature() {
        let sig = sign("order_Abc123", "pay_Xyz789", "rzp_secret");
        assert!(verify_payment_signature("order_Abc123", "pay_Xyz789", &sig, "rzp_secret").is_ok());
    }

    #[test]
    fn rejects_tampered_or_malformed_signatures() {
        let sig = sign("order_Abc123", "pay_Xyz789", "rzp_secret");
        assert_eq!(
            verify_payment_signature("order_Abc123", "pay_Other", &sig, "rzp_secret"),
            Err("Payment signature mismatch")
        );
        assert_eq!(
            verify_payment_signature("order_Abc123", "pay_Xyz789", &sig, "wrong"),
            Err("Payment signature mismatch")
        );
        assert_eq!(
            verify_payment_signature("order_Abc123", "pay_Xyz789", "zz-not-hex", "rzp_secret"),
            Err("Invalid signature hex")
        );
        assert_eq!(
            verify_payment_signature("", "pay_Xyz789", &sig, "rzp_secret"),
            Err("Missing payment fields")
        );
    }

    #[test]
    fn converts_rupees_to_paise() {
        assert_eq!(to_minor_units(Decimal::new(55100, 2)), Some(55100));
        assert_eq!(to_minor_units(Decimal::new(12345, 3)), Some(1235));
        assert_eq!(to_minor_units(Decimal::from(551)), Some(55100));
        assert_eq!(to_minor_units(Decimal::ZERO), None);
        assert_eq!(to_minor_units(Decimal::from(-5)), None);
    }
}
