//! Ledger engine: deposit distribution, buy/sell transactions and target weights.
//!
//! Every mutating operation runs as one unit of work through a
//! [`LedgerExecutor`]. The triggering record (deposit or transaction) is
//! inserted in the same unit as the holding updates it causes, so a failed
//! allocation never leaves a recorded deposit behind.

mod ledger_engine;
mod ledger_errors;
mod ledger_model;
mod ledger_traits;

#[cfg(test)]
mod ledger_engine_tests;

pub use ledger_engine::{
    apply_deposit, apply_transaction, assign_weights, build_deposit, build_transaction,
    build_weight_assignments, LedgerEngine,
};
pub use ledger_errors::LedgerError;
pub use ledger_model::*;
pub use ledger_traits::{
    LedgerExecutor, LedgerRepositoryTrait, LedgerServiceTrait, LedgerUnitOfWork,
};
