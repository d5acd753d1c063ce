use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of a portfolio on one date.
///
/// Only holdings with a price recorded for exactly `date` contribute; the
/// others are left out of both `value` and `weights`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDailyValue {
    pub date: NaiveDate,
    /// Sum of quantity x price over the priced holdings.
    pub value: Decimal,
    /// Asset name to stored target weight.
    pub weights: BTreeMap<String, Decimal>,
}
