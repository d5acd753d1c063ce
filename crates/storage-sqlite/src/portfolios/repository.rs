use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use abacus_core::errors::Error;
use abacus_core::portfolios::{NewPortfolio, Portfolio, PortfolioRepositoryTrait, PortfolioUpdate};
use abacus_core::Result;

use super::model::{NewPortfolioDB, PortfolioDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::portfolios;

pub struct PortfolioRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PortfolioRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for PortfolioRepository {
    async fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let now = Utc::now().naive_utc();
                let row = NewPortfolioDB {
                    id: new_portfolio
                        .id
                        .unwrap_or_else(|| Uuid::new_v4().to_string()),
                    name: new_portfolio.name,
                    description: new_portfolio.description,
                    created_at: now,
                    updated_at: now,
                };

                let created = diesel::insert_into(portfolios::table)
                    .values(&row)
                    .returning(PortfolioDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(created.into())
            })
            .await
    }

    async fn update(&self, portfolio_update: PortfolioUpdate) -> Result<Portfolio> {
        let portfolio_id = portfolio_update.id.clone().unwrap_or_default();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let updated = diesel::update(portfolios::table.find(&portfolio_id))
                    .set((
                        portfolios::name.eq(portfolio_update.name),
                        portfolios::description.eq(portfolio_update.description),
                        portfolios::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .returning(PortfolioDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                updated
                    .map(Portfolio::from)
                    .ok_or_else(|| Error::not_found("Portfolio", portfolio_id))
            })
            .await
    }

    async fn delete(&self, portfolio_id: &str) -> Result<usize> {
        let portfolio_id = portfolio_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(portfolios::table.find(portfolio_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;
        portfolios::table
            .find(portfolio_id)
            .select(PortfolioDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Portfolio::from)
            .ok_or_else(|| Error::not_found("Portfolio", portfolio_id))
    }

    fn list(&self) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = portfolios::table
            .order(portfolios::name.asc())
            .select(PortfolioDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Portfolio::from).collect())
    }
}
