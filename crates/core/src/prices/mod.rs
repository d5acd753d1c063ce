//! Historical asset prices.
//!
//! [`PriceIndex`] is the read-only view the ledger and valuation code depend on.
//! [`PriceRepositoryTrait`] adds the write side used by price recording.

mod prices_model;
mod prices_traits;

pub use prices_model::{NewPrice, Price};
pub use prices_traits::{PriceIndex, PriceRepositoryTrait};
