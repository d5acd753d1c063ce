//! Holding domain models.

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;
use crate::utils::decimal_utils::checked_sum;
use crate::Result;

/// Quantity owned and target weight for one (portfolio, asset) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub portfolio_id: String,
    pub asset_id: String,
    pub quantity: Decimal,
    /// Fraction of new cash allocated to this asset, in `[0, 1]`.
    pub weight: Decimal,
    pub updated_at: NaiveDateTime,
}

impl Holding {
    /// A fresh holding as created by `get_or_create`.
    pub fn empty(id: String, portfolio_id: &str, asset_id: &str) -> Self {
        Self {
            id,
            portfolio_id: portfolio_id.to_string(),
            asset_id: asset_id.to_string(),
            quantity: Decimal::ZERO,
            weight: Decimal::ZERO,
            updated_at: Utc::now().naive_utc(),
        }
    }

    /// Zero quantity and zero weight: nothing left worth keeping.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_zero() && self.weight.is_zero()
    }

    /// Adds `delta` (which may be negative) to the quantity.
    ///
    /// Fails without touching the holding if the result would be negative or
    /// does not fit in a `Decimal`.
    pub fn adjust_quantity(&mut self, delta: Decimal) -> Result<()> {
        let next = checked_sum("quantity", self.quantity, delta)?;
        if next < Decimal::ZERO {
            return Err(LedgerError::NegativeQuantity {
                asset_id: self.asset_id.clone(),
                quantity: next,
            }
            .into());
        }
        self.quantity = next;
        self.updated_at = Utc::now().naive_utc();
        Ok(())
    }

    pub fn set_weight(&mut self, weight: Decimal) {
        self.weight = weight;
        self.updated_at = Utc::now().naive_utc();
    }
}

/// The effect a ledger operation had on one holding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingChange {
    pub asset_id: String,
    pub previous_quantity: Decimal,
    pub quantity: Decimal,
    pub weight: Decimal,
    /// The holding became empty and was deleted.
    pub removed: bool,
}

impl HoldingChange {
    pub fn delta(&self) -> Decimal {
        self.quantity - self.previous_quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn adjust_quantity_rejects_negative_result() {
        let mut holding = Holding::empty("h1".into(), "p1", "a1");
        holding.adjust_quantity(dec!(2.5)).unwrap();

        let err = holding.adjust_quantity(dec!(-3)).unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::NegativeQuantity { .. })
        ));
        assert_eq!(holding.quantity, dec!(2.5));

        holding.adjust_quantity(dec!(-2.5)).unwrap();
        assert!(holding.quantity.is_zero());
    }

    #[test]
    fn empty_requires_zero_weight_and_quantity() {
        let mut holding = Holding::empty("h1".into(), "p1", "a1");
        assert!(holding.is_empty());

        holding.set_weight(dec!(0.25));
        assert!(!holding.is_empty());

        holding.set_weight(Decimal::ZERO);
        holding.adjust_quantity(dec!(1)).unwrap();
        assert!(!holding.is_empty());
    }

    #[test]
    fn adjust_quantity_rejects_overflow() {
        let mut holding = Holding::empty("h1".into(), "p1", "a1");
        holding.adjust_quantity(Decimal::MAX).unwrap();

        let err = holding.adjust_quantity(dec!(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::AmountOutOfRange { .. })
        ));
        assert_eq!(holding.quantity, Decimal::MAX);
    }
}
