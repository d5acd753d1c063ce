//! SQLite storage implementation for asset prices.

mod model;
mod repository;

pub use model::PriceDB;
pub use repository::PriceRepository;
