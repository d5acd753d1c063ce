//! Portfolio repository and service traits.

use async_trait::async_trait;

use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioUpdate};
use crate::errors::Result;

/// Persistence contract for portfolios.
///
/// Deleting a portfolio removes its holdings, deposits and transactions.
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    async fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;

    async fn update(&self, portfolio_update: PortfolioUpdate) -> Result<Portfolio>;

    /// Returns the number of deleted portfolios.
    async fn delete(&self, portfolio_id: &str) -> Result<usize>;

    /// Returns `Error::NotFound` when the portfolio does not exist.
    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio>;

    fn list(&self) -> Result<Vec<Portfolio>>;
}

#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    async fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;
    async fn update_portfolio(&self, portfolio_update: PortfolioUpdate) -> Result<Portfolio>;
    async fn delete_portfolio(&self, portfolio_id: &str) -> Result<()>;
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;
    fn list_portfolios(&self) -> Result<Vec<Portfolio>>;
}
