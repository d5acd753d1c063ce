//! Abacus Core - portfolio ledger domain, services and traits.
//!
//! Deposits are split across a portfolio's holdings by target weight, buys and
//! sells adjust holding quantities, and portfolios are valued from recorded
//! daily prices. This crate is database-agnostic: it defines the repository
//! traits that `abacus-storage-sqlite` implements, and ships an in-memory
//! implementation in [`memory`].

pub mod assets;
pub mod constants;
pub mod errors;
pub mod events;
pub mod holdings;
pub mod ledger;
pub mod memory;
pub mod portfolios;
pub mod prices;
pub mod utils;
pub mod valuation;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
