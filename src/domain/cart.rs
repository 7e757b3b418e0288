//! Cart aggregate.
//!
//! Quantities are fractional weights in the product's own unit, not unit
//! counts: 0.35 kg of picanha is a valid line. The aggregate enforces the
//! minimum increment and the stock ceiling on every mutation, so a cart that
//! made it to checkout is already within bounds (checkout still re-checks
//! against fresh stock).

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::pricing;
use super::weight::{round_weight, WeightUnit};

#[derive(Clone, Debug)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub price_weight_amount: Decimal,
    pub unit: WeightUnit,
    pub available_stock: Decimal,
    pub quantity: Decimal,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        pricing::line_total(self.unit_price, self.price_weight_amount, self.quantity)
    }
}

#[derive(Clone, Debug)]
pub struct Cart {
    min_weight_kg: Decimal,
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(min_weight_kg: Decimal) -> Self {
        Self {
            min_weight_kg,
            lines: vec![],
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds a line, merging with an existing line for the same product.
    pub fn add_line(&mut self, line: CartLine) -> Result<(), CartError> {
        let quantity = round_weight(line.quantity);
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            let merged = round_weight(existing.quantity + quantity);
            check_quantity(self.min_weight_kg, &line, merged)?;
            existing.quantity = merged;
        } else {
            check_quantity(self.min_weight_kg, &line, quantity)?;
            self.lines.push(CartLine { quantity, ..line });
        }
        Ok(())
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn update_quantity(
        &mut self,
        product_id: Uuid,
        quantity: Decimal,
    ) -> Result<(), CartError> {
        let quantity = round_weight(quantity);
        if quantity.is_zero() {
            let before = self.lines.len();
            self.lines.retain(|l| l.product_id != product_id);
            if self.lines.len() == before {
                return Err(CartError::ItemNotFound);
            }
            return Ok(());
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::ItemNotFound)?;
        check_quantity(self.min_weight_kg, line, quantity)?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

fn check_quantity(
    min_weight_kg: Decimal,
    line: &CartLine,
    quantity: Decimal,
) -> Result<(), CartError> {
    let minimum = line.unit.min_quantity(min_weight_kg);
    if quantity < minimum {
        return Err(CartError::BelowMinimum {
            minimum,
            unit: line.unit,
        });
    }
    if quantity > line.available_stock {
        return Err(CartError::InsufficientStock {
            name: line.name.clone(),
            available: line.available_stock,
            unit: line.unit,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("quantidade minima e {minimum} {unit}")]
    BelowMinimum { minimum: Decimal, unit: WeightUnit },

    #[error("estoque insuficiente de {name}: disponivel {available} {unit}")]
    InsufficientStock {
        name: String,
        available: Decimal,
        unit: WeightUnit,
    },

    #[error("item nao esta no carrinho")]
    ItemNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn picanha(quantity: Decimal) -> CartLine {
        CartLine {
            product_id: Uuid::from_u128(1),
            name: "Picanha".into(),
            unit_price: dec!(89.90),
            price_weight_amount: dec!(1),
            unit: WeightUnit::Kg,
            available_stock: dec!(5.0),
            quantity,
        }
    }

    #[test]
    fn merges_lines_for_same_product() {
        let mut cart = Cart::new(dec!(0.1));
        cart.add_line(picanha(dec!(0.5))).unwrap();
        cart.add_line(picanha(dec!(0.3))).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, dec!(0.8));
    }

    #[test]
    fn rejects_below_minimum_weight() {
        let mut cart = Cart::new(dec!(0.1));
        assert!(matches!(
            cart.add_line(picanha(dec!(0.05))),
            Err(CartError::BelowMinimum { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn rejects_more_than_stock_even_when_merging() {
        let mut cart = Cart::new(dec!(0.1));
        cart.add_line(picanha(dec!(3.0))).unwrap();
        assert!(matches!(
            cart.add_line(picanha(dec!(2.5))),
            Err(CartError::InsufficientStock { .. })
        ));
        // Failed merge leaves the original quantity untouched.
        assert_eq!(cart.lines()[0].quantity, dec!(3.0));
    }

    #[test]
    fn update_to_zero_removes_the_line() {
        let mut cart = Cart::new(dec!(0.1));
        cart.add_line(picanha(dec!(1.0))).unwrap();
        cart.update_quantity(Uuid::from_u128(1), Decimal::ZERO)
            .unwrap();
        assert!(cart.is_empty());
        assert!(matches!(
            cart.update_quantity(Uuid::from_u128(1), dec!(1.0)),
            Err(CartError::ItemNotFound)
        ));
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let mut cart = Cart::new(dec!(0.1));
        cart.add_line(picanha(dec!(0.5))).unwrap();
        // 89.90 * 0.5 = 44.95
        assert_eq!(cart.subtotal(), dec!(44.95));
    }
}
