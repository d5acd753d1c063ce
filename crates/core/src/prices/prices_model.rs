//! Price domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Price of one asset on one calendar date. Unique per (asset, date).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub price: Decimal,
    pub updated_at: NaiveDateTime,
}

/// Input model for recording a price. Replaces any price already stored for
/// the same (asset, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrice {
    pub asset_id: String,
    pub date: NaiveDate,
    pub price: Decimal,
}

impl NewPrice {
    pub fn validate(&self) -> Result<()> {
        if self.asset_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "assetId".to_string(),
            )));
        }
        if self.price <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Price must be positive, got {}",
                self.price
            ))));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_price(price: Decimal) -> NewPrice {
        NewPrice {
            asset_id: "a1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            price,
        }
    }

    #[test]
    fn rejects_zero_and_negative_prices() {
        assert!(new_price(dec!(0)).validate().is_err());
        assert!(new_price(dec!(-1.5)).validate().is_err());
        assert!(new_price(dec!(0.0001)).validate().is_ok());
    }

    #[test]
    fn rejects_blank_asset() {
        let mut price = new_price(dec!(1));
        price.asset_id = "  ".to_string();
        assert!(matches!(
            price.validate(),
            Err(Error::Validation(ValidationError::MissingField(_)))
        ));
    }
}
