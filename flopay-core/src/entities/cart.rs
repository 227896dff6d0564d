//! The shopping cart and its totals.
//!
//! Line items are owned by the cart and mutated through quantity updates
//! and removals; the cart is cleared only after an order is finalized.
//! Paying with $FLOCKA earns a 10% discount on the subtotal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use flopay_sdk::objects::SettlementCurrency;

/// A product reference as carried in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price in USD.
    pub unit_price: Decimal,
}

/// One cart line: a product and a positive quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Line total in USD.
    pub fn total(&self) -> Decimal {
        self.product.unit_price * Decimal::from(self.quantity)
    }
}

/// Discount applied to the subtotal when paying with $FLOCKA.
fn flocka_discount_rate() -> Decimal {
    Decimal::new(10, 2)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
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

    /// Add a product to the cart, merging with an existing line for the
    /// same product.
    pub fn add(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => line.quantity += quantity,
            None => self.lines.push(CartLine { product, quantity }),
        }
    }

    /// Set the quantity of a line; zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = quantity;
        }
    }

    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line totals in USD.
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Discount in USD for the chosen settlement currency.
    pub fn discount(&self, currency: SettlementCurrency) -> Decimal {
        match currency {
            SettlementCurrency::Flocka => {
                (self.subtotal() * flocka_discount_rate()).round_dp(2)
            }
            SettlementCurrency::Usdc => Decimal::ZERO,
        }
    }

    /// Order total in USD, two-decimal precision.
    pub fn total(&self, currency: SettlementCurrency) -> Decimal {
        (self.subtotal() - self.discount(currency)).round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, unit_price: Decimal) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            unit_price,
        }
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::new();
        cart.add(product("hoodie", Decimal::new(4500, 2)), 1);
        cart.add(product("hoodie", Decimal::new(4500, 2)), 2);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(product("cap", Decimal::new(2000, 2)), 2);
        cart.update_quantity("cap", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_and_flocka_discount() {
        let mut cart = Cart::new();
        cart.add(product("hoodie", Decimal::new(4500, 2)), 2);
        cart.add(product("cap", Decimal::new(1000, 2)), 1);
        assert_eq!(cart.subtotal(), Decimal::new(10000, 2));

        assert_eq!(cart.discount(SettlementCurrency::Usdc), Decimal::ZERO);
        assert_eq!(cart.total(SettlementCurrency::Usdc), Decimal::new(10000, 2));

        assert_eq!(cart.discount(SettlementCurrency::Flocka), Decimal::new(1000, 2));
        assert_eq!(cart.total(SettlementCurrency::Flocka), Decimal::new(9000, 2));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(product("hoodie", Decimal::new(4500, 2)), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }
}
