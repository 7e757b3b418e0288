//! Pricing rules: line totals, delivery fee tiering, PIX discount, kit pricing
//! and the period-over-period growth math used by the analytics dashboard.
//!
//! Everything here is a pure computation over already-fetched data; the values
//! that used to be hard-coded in several places (delivery fee, free-delivery
//! threshold, PIX percentage) come in through [`PricingSettings`], loaded from
//! the `store_settings` singleton row.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::order::PaymentMethod;
use super::weight::round_weight;

pub const MONEY_SCALE: u32 = 2;

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Business constants from the `store_settings` row.
#[derive(Clone, Copy, Debug)]
pub struct PricingSettings {
    pub delivery_fee: Decimal,
    pub free_delivery_threshold: Decimal,
    pub pix_discount_pct: Decimal,
}

/// Price of `quantity` of a product priced at `unit_price` per
/// `price_weight_amount` of its weight unit, rounded to 3 decimals.
///
/// E.g. R$ 4.50 per 100 g, quantity 300 g -> R$ 13.50.
pub fn line_total(unit_price: Decimal, price_weight_amount: Decimal, quantity: Decimal) -> Decimal {
    round_weight(unit_price * quantity / price_weight_amount)
}

/// Flat fee, waived once the subtotal reaches the free-delivery threshold.
pub fn delivery_fee(subtotal: Decimal, settings: &PricingSettings) -> Decimal {
    if subtotal >= settings.free_delivery_threshold {
        Decimal::ZERO
    } else {
        settings.delivery_fee
    }
}

/// Percentage discount on the subtotal when paying with PIX; zero otherwise.
pub fn pix_discount(
    subtotal: Decimal,
    method: PaymentMethod,
    settings: &PricingSettings,
) -> Decimal {
    match method {
        PaymentMethod::Pix => {
            round_money(subtotal * settings.pix_discount_pct / Decimal::ONE_HUNDRED)
        }
        _ => Decimal::ZERO,
    }
}

/// The amounts recorded on an order at checkout. `total` already includes the
/// delivery fee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CheckoutQuote {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

pub fn quote(subtotal: Decimal, method: PaymentMethod, settings: &PricingSettings) -> CheckoutQuote {
    let subtotal = round_money(subtotal);
    let delivery_fee = delivery_fee(subtotal, settings);
    let discount = pix_discount(subtotal, method, settings);
    CheckoutQuote {
        subtotal,
        delivery_fee,
        discount,
        total: subtotal + delivery_fee - discount,
    }
}

/// One kit constituent as priced at read time.
#[derive(Clone, Debug)]
pub struct KitLine {
    pub unit_price: Decimal,
    pub price_weight_amount: Decimal,
    pub quantity: Decimal,
}

/// Kit price is always derived from the current product prices, never stored:
/// sum of constituent line totals minus the kit's percentage discount.
pub fn kit_price(lines: &[KitLine], discount_pct: Decimal) -> Decimal {
    let sum: Decimal = lines
        .iter()
        .map(|l| line_total(l.unit_price, l.price_weight_amount, l.quantity))
        .sum();
    round_money(sum * (Decimal::ONE_HUNDRED - discount_pct) / Decimal::ONE_HUNDRED)
}

/// Period-over-period growth percentage. An empty previous period counts as
/// +100% when the current one has movement, 0% when both are empty.
pub fn growth(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        if current > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    } else {
        ((current - previous) / previous * Decimal::ONE_HUNDRED).round_dp(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settings() -> PricingSettings {
        PricingSettings {
            delivery_fee: dec!(8.90),
            free_delivery_threshold: dec!(50.00),
            pix_discount_pct: dec!(5.00),
        }
    }

    #[test]
    fn line_total_per_kg() {
        assert_eq!(line_total(dec!(45.00), dec!(1), dec!(0.5)), dec!(22.5));
    }

    #[test]
    fn line_total_per_100g() {
        assert_eq!(line_total(dec!(4.50), dec!(100), dec!(300)), dec!(13.50));
    }

    #[test]
    fn line_total_rounds_to_three_decimals() {
        // 33.33 * 0.333 = 11.09889
        assert_eq!(line_total(dec!(33.33), dec!(1), dec!(0.333)), dec!(11.099));
    }

    #[test]
    fn delivery_fee_waived_at_threshold() {
        let s = settings();
        assert_eq!(delivery_fee(dec!(49.99), &s), dec!(8.90));
        assert_eq!(delivery_fee(dec!(50.00), &s), Decimal::ZERO);
        assert_eq!(delivery_fee(dec!(120.00), &s), Decimal::ZERO);
    }

    #[test]
    fn pix_discount_only_for_pix() {
        let s = settings();
        assert_eq!(pix_discount(dec!(45.00), PaymentMethod::Pix, &s), dec!(2.25));
        assert_eq!(
            pix_discount(dec!(45.00), PaymentMethod::Cartao, &s),
            Decimal::ZERO
        );
    }

    #[test]
    fn quote_matches_worked_example() {
        // R$ 45.00 in the cart, paid with PIX: fee 8.90, discount 2.25, total 51.65.
        let q = quote(dec!(45.00), PaymentMethod::Pix, &settings());
        assert_eq!(q.subtotal, dec!(45.00));
        assert_eq!(q.delivery_fee, dec!(8.90));
        assert_eq!(q.discount, dec!(2.25));
        assert_eq!(q.total, dec!(51.65));
    }

    #[test]
    fn quote_above_threshold_has_no_fee() {
        let q = quote(dec!(80.00), PaymentMethod::Dinheiro, &settings());
        assert_eq!(q.delivery_fee, Decimal::ZERO);
        assert_eq!(q.discount, Decimal::ZERO);
        assert_eq!(q.total, dec!(80.00));
    }

    #[test]
    fn kit_price_applies_discount_over_line_sum() {
        let lines = [
            KitLine {
                unit_price: dec!(30.00),
                price_weight_amount: dec!(1),
                quantity: dec!(1.0),
            },
            KitLine {
                unit_price: dec!(20.00),
                price_weight_amount: dec!(1),
                quantity: dec!(0.5),
            },
        ];
        // 30.00 + 10.00 = 40.00, minus 10% -> 36.00
        assert_eq!(kit_price(&lines, dec!(10)), dec!(36.00));
        assert_eq!(kit_price(&lines, Decimal::ZERO), dec!(40.00));
    }

    #[test]
    fn growth_handles_empty_previous_period() {
        assert_eq!(growth(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(growth(dec!(10), Decimal::ZERO), dec!(100));
        assert_eq!(growth(dec!(150), dec!(100)), dec!(50.0));
        assert_eq!(growth(dec!(80), dec!(100)), dec!(-20.0));
    }
}
