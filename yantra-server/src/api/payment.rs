//! Payment gateway endpoints

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use super::ApiResult;
use crate::payment::{self, GatewayOrder};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Amount in rupees
    pub amount: Option<Decimal>,
    pub receipt: Option<String>,
}

/// POST /api/payment/create-order
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> ApiResult<GatewayOrder> {
    let amount = req.amount.ok_or_else(|| AppError::missing_fields(&["amount"]))?;
    let paise = payment::to_minor_units(amount).ok_or_else(|| {
        AppError::new(ErrorCode::PaymentInvalidAmount).with_detail("amount", amount.to_string())
    })?;
    let receipt = req
        .receipt
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| format!("rcpt_{}", shared::util::now_millis()));

    let order = state
        .razorpay
        .create_order(paise, &receipt)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, amount = %amount, "Payment gateway order creation failed");
            AppError::new(ErrorCode::PaymentFailed)
        })?;

    tracing::info!(gateway_order_id = %order.id, amount = paise, "Payment order created");
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub verified: bool,
}

/// POST /api/payment/verify
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyPaymentRequest>,
) -> ApiResult<VerifyPaymentResponse> {
    if let Err(reason) = state.razorpay.verify_payment(
        &req.razorpay_order_id,
        &req.razorpay_payment_id,
        &req.razorpay_signature,
    ) {
        tracing::warn!(
            gateway_order_id = %req.razorpay_order_id,
            reason,
            "Payment signature verification failed"
        );
        return Err(AppError::new(ErrorCode::PaymentSignatureInvalid));
    }

    tracing::info!(
        gateway_order_id = %req.razorpay_order_id,
        payment_id = %req.razorpay_payment_id,
        "Payment verified"
    );
    Ok(Json(VerifyPaymentResponse { verified: true }))
}
