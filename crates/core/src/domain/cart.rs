use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Line items in insertion order; every line has quantity >= 1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Adds one unit, merging into an existing line. Returns the new quantity.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|line| line.product_id == product.id) {
            line.quantity += 1;
            return line.quantity;
        }

        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
        });
        1
    }

    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    /// Sets an absolute quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }

        match self.lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn take_lines(&mut self) -> Vec<CartLine> {
        std::mem::take(&mut self.lines)
    }
}
