use super::holdings_model::Holding;
use crate::errors::Result;

/// Holding access inside an open unit of work.
///
/// Implementations only exist for the duration of a `LedgerExecutor::execute`
/// job; everything written through them commits or rolls back together.
pub trait HoldingStore {
    /// Returns the holding for the pair, creating it with quantity 0 and
    /// weight 0 when it does not exist yet.
    fn get_or_create(&mut self, portfolio_id: &str, asset_id: &str) -> Result<Holding>;

    fn list_by_portfolio(&mut self, portfolio_id: &str) -> Result<Vec<Holding>>;

    /// Persists quantity and weight of an existing holding.
    fn save(&mut self, holding: &Holding) -> Result<Holding>;

    /// Deletes the holding iff quantity and weight are both zero.
    ///
    /// Returns whether a row was removed.
    fn delete_if_empty(&mut self, holding: &Holding) -> Result<bool>;
}

/// Snapshot reads of holdings outside the ledger engine.
///
/// Reads are not synchronized with writers; a listing may mix holdings read
/// before and after a concurrent unit of work.
pub trait HoldingRepositoryTrait: Send + Sync {
    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<Holding>>;

    fn get_holding(&self, portfolio_id: &str, asset_id: &str) -> Result<Option<Holding>>;
}
