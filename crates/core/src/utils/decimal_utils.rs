//! Rounding helpers shared by the ledger.
//!
//! Every value is rounded once, half-even, to the scale of the column it lands in.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{CASH_SCALE, QUANTITY_SCALE, WEIGHT_SCALE};
use crate::ledger::LedgerError;
use crate::Result;

pub fn round_cash(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CASH_SCALE, RoundingStrategy::MidpointNearestEven)
}

pub fn round_weight(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(WEIGHT_SCALE, RoundingStrategy::MidpointNearestEven)
}

pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Converts a cash amount into an asset quantity at `price`.
///
/// Callers guarantee `price > 0`. Fails when the quotient does not fit in a
/// `Decimal`.
pub fn cash_to_quantity(cash: Decimal, price: Decimal) -> Result<Decimal> {
    cash.checked_div(price)
        .map(round_quantity)
        .ok_or_else(|| out_of_range("quantity", cash))
}

/// `a * b`, failing instead of overflowing.
pub fn checked_product(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b).ok_or_else(|| out_of_range(field, a))
}

/// `a + b`, failing instead of overflowing.
pub fn checked_sum(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(|| out_of_range(field, b))
}

fn out_of_range(field: &'static str, value: Decimal) -> crate::Error {
    LedgerError::AmountOutOfRange { field, value }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cash_rounds_half_even() {
        assert_eq!(round_cash(dec!(10.005)), dec!(10.00));
        assert_eq!(round_cash(dec!(10.015)), dec!(10.02));
    }

    #[test]
    fn weight_keeps_four_digits() {
        assert_eq!(round_weight(dec!(0.33335)), dec!(0.3334));
        assert_eq!(round_weight(dec!(0.6)), dec!(0.6));
    }

    #[test]
    fn quantity_from_cash_is_rounded_to_eight_digits() {
        assert_eq!(cash_to_quantity(dec!(100), dec!(3)).unwrap(), dec!(33.33333333));
        assert_eq!(cash_to_quantity(dec!(60), dec!(10)).unwrap(), dec!(6));
    }

    #[test]
    fn oversized_arithmetic_fails_instead_of_panicking() {
        let huge = Decimal::MAX;
        let err = cash_to_quantity(huge, dec!(0.5)).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Ledger(LedgerError::AmountOutOfRange { field: "quantity", .. })
        ));
        assert!(checked_product("value", huge, dec!(2)).is_err());
        assert!(checked_sum("quantity", huge, dec!(1)).is_err());
        assert_eq!(checked_sum("quantity", dec!(1.5), dec!(2)).unwrap(), dec!(3.5));
    }
}
