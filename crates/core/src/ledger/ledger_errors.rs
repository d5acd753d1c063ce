use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger invariant violations. All of them are correctable by the caller.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Weights of portfolio {portfolio_id} must sum to 100% (currently {total})")]
    WeightsNotFullyAllocated {
        portfolio_id: String,
        total: Decimal,
    },

    #[error("No price recorded for asset {asset_id} on {date}")]
    MissingPrice { asset_id: String, date: NaiveDate },

    #[error("Cannot sell more than owned: asset {asset_id} holds {held}, requested {requested}")]
    InsufficientQuantity {
        asset_id: String,
        held: Decimal,
        requested: Decimal,
    },

    #[error("Quantity of asset {asset_id} would become negative ({quantity})")]
    NegativeQuantity { asset_id: String, quantity: Decimal },

    #[error("Weight {weight} for asset {asset_id} must be between 0 and 1")]
    WeightOutOfRange { asset_id: String, weight: Decimal },

    #[error("{field} must be positive, got {value}")]
    NonPositiveAmount { field: &'static str, value: Decimal },

    #[error("Amount {value} is too large: {field} would overflow")]
    AmountOutOfRange { field: &'static str, value: Decimal },

    #[error("Asset {asset_id} appears more than once")]
    DuplicateAsset { asset_id: String },
}
