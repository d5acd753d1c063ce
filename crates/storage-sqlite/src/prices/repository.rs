use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use abacus_core::prices::{NewPrice, Price, PriceIndex, PriceRepositoryTrait};
use abacus_core::Result;

use super::model::PriceDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::prices;
use crate::utils::chunk_for_sqlite;

/// Price history storage. Reads go through the pool, writes through the
/// writer actor.
pub struct PriceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

fn into_prices(rows: Vec<PriceDB>) -> Result<Vec<Price>> {
    rows.into_iter().map(Price::try_from).collect()
}

impl PriceIndex for PriceRepository {
    fn latest_price(&self, asset_id: &str) -> Result<Option<Price>> {
        let mut conn = get_connection(&self.pool)?;
        prices::table
            .filter(prices::asset_id.eq(asset_id))
            .order(prices::date.desc())
            .select(PriceDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Price::try_from)
            .transpose()
    }

    fn price_on_date(&self, asset_id: &str, date: NaiveDate) -> Result<Option<Price>> {
        let mut conn = get_connection(&self.pool)?;
        prices::table
            .filter(prices::asset_id.eq(asset_id))
            .filter(prices::date.eq(date))
            .select(PriceDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Price::try_from)
            .transpose()
    }

    fn prices_on_date(&self, asset_ids: &[String], date: NaiveDate) -> Result<Vec<Price>> {
        let mut conn = get_connection(&self.pool)?;
        let mut rows: Vec<PriceDB> = Vec::with_capacity(asset_ids.len());
        for chunk in chunk_for_sqlite(asset_ids) {
            let found: Vec<PriceDB> = prices::table
                .filter(prices::asset_id.eq_any(chunk))
                .filter(prices::date.eq(date))
                .select(PriceDB::as_select())
                .load(&mut conn)
                .map_err(StorageError::from)?;
            rows.extend(found);
        }
        into_prices(rows)
    }

    fn prices_in_range(
        &self,
        asset_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Price>> {
        let mut conn = get_connection(&self.pool)?;
        let mut rows: Vec<PriceDB> = Vec::new();
        for chunk in chunk_for_sqlite(asset_ids) {
            let found: Vec<PriceDB> = prices::table
                .filter(prices::asset_id.eq_any(chunk))
                .filter(prices::date.between(start, end))
                .select(PriceDB::as_select())
                .load(&mut conn)
                .map_err(StorageError::from)?;
            rows.extend(found);
        }
        // Chunks are ordered individually; restore the global order.
        rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.asset_id.cmp(&b.asset_id)));
        into_prices(rows)
    }
}

#[async_trait]
impl PriceRepositoryTrait for PriceRepository {
    async fn upsert_price(&self, new_price: NewPrice) -> Result<Price> {
        debug!(
            "Upserting price for {} on {}",
            new_price.asset_id, new_price.date
        );
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Price> {
                let now = Utc::now().naive_utc();
                let row = PriceDB {
                    id: Uuid::new_v4().to_string(),
                    asset_id: new_price.asset_id,
                    date: new_price.date,
                    price: new_price.price.to_string(),
                    updated_at: now,
                };

                let stored = diesel::insert_into(prices::table)
                    .values(&row)
                    .on_conflict((prices::asset_id, prices::date))
                    .do_update()
                    .set((prices::price.eq(&row.price), prices::updated_at.eq(now)))
                    .returning(PriceDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Price::try_from(stored)
            })
            .await
    }

    fn list_prices_for_asset(&self, asset_id: &str) -> Result<Vec<Price>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = prices::table
            .filter(prices::asset_id.eq(asset_id))
            .order(prices::date.asc())
            .select(PriceDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        into_prices(rows)
    }
}
