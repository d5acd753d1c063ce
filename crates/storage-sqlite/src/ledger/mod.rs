//! Ledger persistence: the unit-of-work executor and deposit/transaction
//! listings.

mod executor;
mod model;
mod repository;


pub use executor::SqliteLedgerExecutor;
pub use model::{DepositDB, TransactionDB};
pub use repository::LedgerRepository;
