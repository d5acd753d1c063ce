//! Utility functions for SQLite storage operations.
//!
//! Decimal columns are stored as TEXT; [`parse_decimal`] reads them back.
//! [`chunk_for_sqlite`] keeps `IN (...)` lists under SQLite's parameter limit.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;
use abacus_core::Result;

/// Ids per `IN (...)` query. SQLite allows 999 bound parameters by default;
/// the rest is headroom for the other parameters of the statement.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Splits `items` into slices of at most [`SQLITE_MAX_PARAMS_CHUNK`].
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Parses a decimal TEXT column. A malformed value is a storage error, never
/// silently zero.
pub fn parse_decimal(value: &str, column: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| {
        log::error!("Failed to parse {} '{}' as decimal: {}", column, value, e);
        StorageError::SerializationError(format!("{} '{}': {}", column, value, e)).into()
    })
}
