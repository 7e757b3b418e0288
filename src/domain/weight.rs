//! Weight units and quantity rounding.
//!
//! Products are sold by weight: each product carries a reference unit (kg or g)
//! and every quantity attached to it (stock, cart, order line) is denominated in
//! that same unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weight quantities carry at most 3 decimal places (gram precision on kg).
pub const WEIGHT_SCALE: u32 = 3;

pub fn round_weight(value: Decimal) -> Decimal {
    value.round_dp(WEIGHT_SCALE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    G,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::G => "g",
        }
    }

    /// Minimum cart increment for this unit, given the store-wide minimum in kg.
    pub fn min_quantity(&self, min_kg: Decimal) -> Decimal {
        match self {
            Self::Kg => min_kg,
            Self::G => min_kg * Decimal::from(1000),
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = UnknownWeightUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Self::Kg),
            "g" => Ok(Self::G),
            other => Err(UnknownWeightUnit(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unidade de peso desconhecida: {0}")]
pub struct UnknownWeightUnit(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_and_prints_units() {
        assert_eq!("kg".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert_eq!("g".parse::<WeightUnit>().unwrap(), WeightUnit::G);
        assert!("lb".parse::<WeightUnit>().is_err());
        assert_eq!(WeightUnit::G.to_string(), "g");
    }

    #[test]
    fn min_quantity_scales_with_unit() {
        assert_eq!(WeightUnit::Kg.min_quantity(dec!(0.1)), dec!(0.1));
        assert_eq!(WeightUnit::G.min_quantity(dec!(0.1)), dec!(100.0));
    }

    #[test]
    fn rounds_to_gram_precision() {
        assert_eq!(round_weight(dec!(1.23456)), dec!(1.235));
        assert_eq!(round_weight(dec!(0.1)), dec!(0.1));
    }
}
