//! SQLite storage implementation for Abacus.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `abacus-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for portfolios, assets, prices and holdings
//! - The ledger executor, which runs each ledger operation as one write transaction
//!
//! ```text
//!          core (domain, traits)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod assets;
pub mod holdings;
pub mod ledger;
pub mod portfolios;
pub mod prices;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use assets::AssetRepository;
pub use holdings::HoldingRepository;
pub use ledger::{LedgerRepository, SqliteLedgerExecutor};
pub use portfolios::PortfolioRepository;
pub use prices::PriceRepository;

// Re-export from abacus-core for convenience
pub use abacus_core::errors::{DatabaseError, Error, Result};
