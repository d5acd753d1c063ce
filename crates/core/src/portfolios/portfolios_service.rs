use log::debug;
use std::sync::Arc;

use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioUpdate};
use super::portfolios_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
use crate::errors::{Error, Result};

/// Service for managing portfolios.
pub struct PortfolioService {
    repository: Arc<dyn PortfolioRepositoryTrait>,
}

impl PortfolioService {
    pub fn new(repository: Arc<dyn PortfolioRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        new_portfolio.validate()?;
        let new_portfolio = NewPortfolio {
            name: new_portfolio.name.trim().to_string(),
            ..new_portfolio
        };
        debug!("Creating portfolio '{}'", new_portfolio.name);
        self.repository.create(new_portfolio).await
    }

    async fn update_portfolio(&self, portfolio_update: PortfolioUpdate) -> Result<Portfolio> {
        portfolio_update.validate()?;
        let portfolio_update = PortfolioUpdate {
            name: portfolio_update.name.trim().to_string(),
            ..portfolio_update
        };
        self.repository.update(portfolio_update).await
    }

    async fn delete_portfolio(&self, portfolio_id: &str) -> Result<()> {
        let deleted = self.repository.delete(portfolio_id).await?;
        if deleted == 0 {
            return Err(Error::not_found("Portfolio", portfolio_id));
        }
        debug!("Deleted portfolio {} and its holdings", portfolio_id);
        Ok(())
    }

    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.repository.get_by_id(portfolio_id)
    }

    fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        self.repository.list()
    }
}
