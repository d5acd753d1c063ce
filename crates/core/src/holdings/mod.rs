//! Holdings: a portfolio's position (quantity, target weight) in one asset.

mod holdings_model;
mod holdings_traits;

pub use holdings_model::{Holding, HoldingChange};
pub use holdings_traits::{HoldingRepositoryTrait, HoldingStore};
