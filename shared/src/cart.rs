//! Cart pricing calculator
//!
//! Unit price precedence for a line:
//! variant sale price > variant price > product sale price > product price > 0,
//! plus a flat [`ENERGIZATION_SURCHARGE`] when the line is energized.
//!
//! The same calculation backs the browser cart and the server-side
//! re-pricing of submitted orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ContentItem, Variant};

/// Flat add-on charged per unit for energized items
pub const ENERGIZATION_SURCHARGE: Decimal = Decimal::from_parts(101, 0, 0, false, 0);

/// A single cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub variant: Option<Variant>,
    pub quantity: u32,
    pub energized: bool,
}

impl CartLine {
    /// Build a line from a catalog item, selecting a variant by name.
    ///
    /// Returns `None` when the named variant does not exist on the item.
    pub fn from_item(
        item: &ContentItem,
        variant: Option<&str>,
        quantity: u32,
        energized: bool,
    ) -> Option<Self> {
        let variant = match variant {
            Some(name) => Some(item.variant(name)?.clone()),
            None => None,
        };
        Some(Self {
            product_id: item.id,
            name: item.name.clone(),
            price: Some(item.price),
            sale_price: item.sale_price,
            variant,
            quantity,
            energized,
        })
    }

    /// Identity used to merge repeated additions of the same thing
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            variant: self.variant.as_ref().map(|v| v.name.clone()),
            energized: self.energized,
        }
    }

    /// Price of one unit before the surcharge
    pub fn base_price(&self) -> Decimal {
        let variant = self.variant.as_ref();
        variant
            .and_then(|v| v.sale_price)
            .or_else(|| variant.and_then(|v| v.price))
            .or(self.sale_price)
            .or(self.price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Price of one unit including the energization surcharge
    pub fn unit_price(&self) -> Decimal {
        if self.energized {
            self.base_price() + ENERGIZATION_SURCHARGE
        } else {
            self.base_price()
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: Uuid,
    pub variant: Option<String>,
    pub energized: bool,
}

/// Client-side cart state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Add a line, merging quantities with an identical existing line.
    /// Zero-quantity additions are ignored.
    pub fn add(&mut self, line: CartLine) {
        if line.quantity == 0 {
            return;
        }
        let key = line.key();
        match self.lines.iter_mut().find(|l| l.key() == key) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.push(line),
        }
    }

    /// Decrease a line's quantity by one; the line is dropped when it reaches zero.
    pub fn decrement(&mut self, key: &LineKey) {
        self.set_quantity(key, self.quantity_of(key).saturating_sub(1));
    }

    /// Set a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) {
        if quantity == 0 {
            self.remove(key);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| &l.key() == key) {
            line.quantity = quantity;
        }
    }

    pub fn remove(&mut self, key: &LineKey) {
        self.lines.retain(|l| &l.key() != key);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn quantity_of(&self, key: &LineKey) -> u32 {
        self.lines
            .iter()
            .find(|l| &l.key() == key)
            .map_or(0, |l| l.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: Option<i64>, sale: Option<i64>, variant: Option<Variant>) -> CartLine {
        CartLine {
            product_id: Uuid::nil(),
            name: "Surya Yantra".to_string(),
            price: price.map(Decimal::from),
            sale_price: sale.map(Decimal::from),
            variant,
            quantity: 1,
            energized: false,
        }
    }

    fn variant(price: Option<i64>, sale: Option<i64>) -> Variant {
        Variant {
            name: "Gold plated".to_string(),
            price: price.map(Decimal::from),
            sale_price: sale.map(Decimal::from),
            stock: None,
        }
    }

    #[test]
    fn variant_sale_price_wins_and_surcharge_is_additive() {
        let mut l = line(Some(600), Some(400), Some(variant(Some(500), Some(450))));
        l.energized = true;
        assert_eq!(l.unit_price(), Decimal::from(551));
    }

    #[test]
    fn precedence_falls_through_each_level() {
        assert_eq!(
            line(Some(600), Some(400), Some(variant(Some(500), None))).unit_price(),
            Decimal::from(500)
        );
        assert_eq!(
            line(Some(600), Some(400), Some(variant(None, None))).unit_price(),
            Decimal::from(400)
        );
        assert_eq!(line(Some(600), None, None).unit_price(), Decimal::from(600));
        assert_eq!(line(None, None, None).unit_price(), Decimal::ZERO);
    }

    #[test]
    fn line_total_and_subtotal() {
        let mut cart = Cart::new();
        let mut a = line(Some(300), None, None);
        a.quantity = 2;
        let mut b = line(Some(200), Some(150), None);
        b.product_id = Uuid::from_u128(2);
        b.energized = true;
        cart.add(a);
        cart.add(b);

        // 2 * 300 + 1 * (150 + 101)
        assert_eq!(cart.subtotal(), Decimal::from(851));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn add_merges_identical_lines_only() {
        let mut cart = Cart::new();
        cart.add(line(Some(300), None, None));
        cart.add(line(Some(300), None, None));
        let mut energized = line(Some(300), None, None);
        energized.energized = true;
        cart.add(energized);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn decrement_to_zero_removes_line() {
        let mut cart = Cart::new();
        let l = line(Some(300), None, None);
        let key = l.key();
        cart.add(l);

        cart.decrement(&key);
        assert!(cart.is_empty());

        // decrementing a missing line is a no-op
        cart.decrement(&key);
        assert!(cart.is_empty());
    }

    #[test]
    fn from_item_rejects_unknown_variant() {
        let item = ContentItem {
            id: Uuid::from_u128(7),
            name: "Rudraksha Mala".to_string(),
            slug: "rudraksha-mala".to_string(),
            description: None,
            content: None,
            price: Decimal::from(600),
            sale_price: Some(Decimal::from(400)),
            images: vec![],
            item_type: crate::models::ContentType::Product,
            stock: 5,
            is_published: true,
            availability: "In Stock".to_string(),
            specifications: vec![],
            benefits: vec![],
            variants: vec![variant(Some(500), Some(450))],
            how_to_use: vec![],
            package_contents: vec![],
            category_ids: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        assert!(CartLine::from_item(&item, Some("Silver"), 1, false).is_none());
        let l = CartLine::from_item(&item, Some("Gold plated"), 2, false).unwrap();
        assert_eq!(l.line_total(), Decimal::from(900));
    }
}
