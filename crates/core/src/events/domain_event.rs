//! Domain event types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::TransactionType;

/// The ledger operation an event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOperation {
    Deposit,
    Transaction,
    WeightAssignment,
}

impl LedgerOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerOperation::Deposit => "deposit",
            LedgerOperation::Transaction => "transaction",
            LedgerOperation::WeightAssignment => "weight_assignment",
        }
    }
}

/// Domain events emitted by the ledger engine.
///
/// Success events are emitted after the unit of work committed. A rejected
/// operation emits exactly one `LedgerOperationRejected` and nothing else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A deposit was recorded and allocated across the portfolio's holdings.
    DepositDistributed {
        portfolio_id: String,
        deposit_id: String,
        amount: Decimal,
        date: NaiveDate,
        /// Assets that received part of the deposit.
        asset_ids: Vec<String>,
    },

    /// A buy or sell changed one holding's quantity.
    TransactionApplied {
        portfolio_id: String,
        transaction_id: String,
        asset_id: String,
        transaction_type: TransactionType,
        quantity: Decimal,
    },

    /// A holding reached zero quantity and zero weight and was deleted.
    HoldingRemoved {
        portfolio_id: String,
        asset_id: String,
    },

    TargetWeightsChanged {
        portfolio_id: String,
        asset_ids: Vec<String>,
    },

    /// An operation failed and left the ledger unchanged.
    LedgerOperationRejected {
        portfolio_id: String,
        operation: LedgerOperation,
        reason: String,
    },
}

impl DomainEvent {
    pub fn deposit_distributed(
        portfolio_id: String,
        deposit_id: String,
        amount: Decimal,
        date: NaiveDate,
        asset_ids: Vec<String>,
    ) -> Self {
        Self::DepositDistributed {
            portfolio_id,
            deposit_id,
            amount,
            date,
            asset_ids,
        }
    }

    pub fn transaction_applied(
        portfolio_id: String,
        transaction_id: String,
        asset_id: String,
        transaction_type: TransactionType,
        quantity: Decimal,
    ) -> Self {
        Self::TransactionApplied {
            portfolio_id,
            transaction_id,
            asset_id,
            transaction_type,
            quantity,
        }
    }

    pub fn holding_removed(portfolio_id: String, asset_id: String) -> Self {
        Self::HoldingRemoved {
            portfolio_id,
            asset_id,
        }
    }

    pub fn target_weights_changed(portfolio_id: String, asset_ids: Vec<String>) -> Self {
        Self::TargetWeightsChanged {
            portfolio_id,
            asset_ids,
        }
    }

    pub fn ledger_operation_rejected(
        portfolio_id: String,
        operation: LedgerOperation,
        reason: String,
    ) -> Self {
        Self::LedgerOperationRejected {
            portfolio_id,
            operation,
            reason,
        }
    }

    /// Portfolio the event belongs to.
    pub fn portfolio_id(&self) -> &str {
        match self {
            Self::DepositDistributed { portfolio_id, .. }
            | Self::TransactionApplied { portfolio_id, .. }
            | Self::HoldingRemoved { portfolio_id, .. }
            | Self::TargetWeightsChanged { portfolio_id, .. }
            | Self::LedgerOperationRejected { portfolio_id, .. } => portfolio_id,
        }
    }

    /// Short snake_case name, used as the log message.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DepositDistributed { .. } => "deposit_distributed",
            Self::TransactionApplied { .. } => "transaction_applied",
            Self::HoldingRemoved { .. } => "holding_removed",
            Self::TargetWeightsChanged { .. } => "target_weights_changed",
            Self::LedgerOperationRejected { .. } => "ledger_operation_rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn serializes_with_type_tag() {
        let event = DomainEvent::transaction_applied(
            "p1".to_string(),
            "t1".to_string(),
            "a1".to_string(),
            TransactionType::Sell,
            dec!(1.5),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "transaction_applied");
        assert_eq!(json["transaction_type"], "sell");
        assert_eq!(json["quantity"], "1.5");
    }

    #[test]
    fn rejected_event_carries_operation() {
        let event = DomainEvent::ledger_operation_rejected(
            "p1".to_string(),
            LedgerOperation::WeightAssignment,
            "bad weight".to_string(),
        );

        assert_eq!(event.portfolio_id(), "p1");
        assert_eq!(event.name(), "ledger_operation_rejected");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["operation"], "weight_assignment");
    }
}
