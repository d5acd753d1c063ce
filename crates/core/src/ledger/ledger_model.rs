//! Ledger domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};
use crate::holdings::HoldingChange;

/// Cash paid into a portfolio on a date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub id: String,
    pub portfolio_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// Inbound request to record a deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub portfolio_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// A validated deposit that has not been recorded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeposit {
    pub portfolio_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "buy",
            TransactionType::Sell => "sell",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TransactionType::Buy),
            "sell" => Ok(TransactionType::Sell),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown transaction type '{}'",
                other
            )))),
        }
    }
}

/// A recorded buy or sell. `quantity` and `price` are the values the holding
/// update was computed with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub portfolio_id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub value: Decimal,
    pub quantity: Decimal,
    pub price: Decimal,
    pub created_at: NaiveDateTime,
}

/// Inbound request to record a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub portfolio_id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub value: Decimal,
}

/// A validated transaction that has not been recorded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub portfolio_id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub value: Decimal,
}

/// Price and quantity a transaction was converted at, plus its holding effect.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFill {
    pub price: Decimal,
    pub quantity: Decimal,
    pub change: HoldingChange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightAssignment {
    pub asset_id: String,
    pub weight: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepositReceipt {
    pub deposit: Deposit,
    pub changes: Vec<HoldingChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction: Transaction,
    pub change: HoldingChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_parses_case_insensitively() {
        assert_eq!("BUY".parse::<TransactionType>().unwrap(), TransactionType::Buy);
        assert_eq!(" sell ".parse::<TransactionType>().unwrap(), TransactionType::Sell);
        assert!("hold".parse::<TransactionType>().is_err());
    }

    #[test]
    fn transaction_type_serializes_lowercase() {
        let json = serde_json::to_string(&TransactionType::Sell).unwrap();
        assert_eq!(json, "\"sell\"");
    }
}
