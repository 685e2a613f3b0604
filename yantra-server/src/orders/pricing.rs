//! Server-side order pricing
//!
//! Client prices are display hints only. Every line is re-priced from the
//! catalog with the same calculator the cart uses, and the client's total
//! must agree with ours within [`MONEY_TOLERANCE`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::cart::CartLine;
use shared::error::{AppError, ErrorCode};
use shared::models::{CartItemInput, ContentItem, MAX_LINE_QUANTITY};
use uuid::Uuid;

/// Rounding slack accepted between client and server totals
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Shipping charge policy
#[derive(Debug, Clone, Default)]
pub struct ShippingPolicy {
    pub flat_fee: Decimal,
    /// Subtotal at or above which shipping is free
    pub free_threshold: Option<Decimal>,
}

impl ShippingPolicy {
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        match self.free_threshold {
            Some(threshold) if subtotal >= threshold => Decimal::ZERO,
            _ => self.flat_fee,
        }
    }
}

/// One re-priced order line
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub content_item_id: Uuid,
    pub name: String,
    pub variant: Option<String>,
    pub energized: bool,
    pub quantity: i32,
    /// Unit price including the energization surcharge
    pub unit_price: Decimal,
    /// Whether placing the order decrements stock
    pub reserve_stock: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Re-price submitted cart lines against catalog items keyed by id
pub fn price_cart(
    cart: &[CartItemInput],
    catalog: &HashMap<Uuid, ContentItem>,
    shipping: &ShippingPolicy,
) -> Result<PricedOrder, AppError> {
    if cart.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let mut lines = Vec::with_capacity(cart.len());
    let mut subtotal = Decimal::ZERO;

    for input in cart {
        if !(1..=MAX_LINE_QUANTITY).contains(&input.quantity) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Quantity must be between 1 and {MAX_LINE_QUANTITY}"),
            )
            .with_detail("productId", input.id.to_string()));
        }

        let item = catalog
            .get(&input.id)
            .filter(|item| item.is_published)
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("productId", input.id.to_string())
            })?;

        let variant = input.variant.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let line = CartLine::from_item(item, variant, input.quantity as u32, input.energized)
            .ok_or_else(|| {
                AppError::new(ErrorCode::VariantNotFound)
                    .with_detail("productId", item.id.to_string())
                    .with_detail("variant", variant.unwrap_or_default().to_string())
            })?;

        subtotal += line.line_total();
        lines.push(PricedLine {
            content_item_id: item.id,
            name: item.name.clone(),
            variant: line.variant.as_ref().map(|v| v.name.clone()),
            energized: line.energized,
            quantity: input.quantity,
            unit_price: line.unit_price(),
            reserve_stock: item.tracks_stock(),
        });
    }

    let shipping = shipping.shipping_for(subtotal);
    Ok(PricedOrder {
        lines,
        subtotal,
        shipping,
        total: subtotal + shipping,
    })
}

/// Reject a client total that disagrees with the computed one
pub fn check_client_total(submitted: Decimal, computed: Decimal) -> Result<(), AppError> {
    if (submitted - computed).abs() > MONEY_TOLERANCE {
        return Err(AppError::new(ErrorCode::OrderTotalMismatch)
            .with_detail("expected", computed.to_string())
            .with_detail("submitted", submitted.to_string()));
    }
    Ok(())
}
