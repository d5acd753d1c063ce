use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use abacus_core::assets::{Asset, AssetRepositoryTrait, AssetUpdate, NewAsset};
use abacus_core::{Error, Result};

use super::model::AssetDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::assets;
use crate::utils::chunk_for_sqlite;

/// Repository for managing asset data in the database
pub struct AssetRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl AssetRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AssetRepositoryTrait for AssetRepository {
    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        let row = AssetDB {
            id: new_asset.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_asset.name,
            created_at: Utc::now().naive_utc(),
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let created = diesel::insert_into(assets::table)
                    .values(&row)
                    .returning(AssetDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(created.into())
            })
            .await
    }

    async fn update(&self, asset_update: AssetUpdate) -> Result<Asset> {
        let asset_id = asset_update.id.clone().unwrap_or_default();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let updated = diesel::update(assets::table.find(&asset_id))
                    .set(assets::name.eq(asset_update.name))
                    .returning(AssetDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                updated
                    .map(Asset::from)
                    .ok_or_else(|| Error::not_found("Asset", asset_id))
            })
            .await
    }

    fn get_by_id(&self, asset_id: &str) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;

        assets::table
            .find(asset_id)
            .select(AssetDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Asset::from)
            .ok_or_else(|| Error::not_found("Asset", asset_id))
    }

    fn list(&self) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;

        let results = assets::table
            .order(assets::name.asc())
            .select(AssetDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;

        Ok(results.into_iter().map(Asset::from).collect())
    }

    fn list_by_asset_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;

        let mut found = Vec::with_capacity(asset_ids.len());
        for chunk in chunk_for_sqlite(asset_ids) {
            let rows: Vec<AssetDB> = assets::table
                .filter(assets::id.eq_any(chunk))
                .select(AssetDB::as_select())
                .load(&mut conn)
                .map_err(StorageError::from)?;
            found.extend(rows.into_iter().map(Asset::from));
        }
        Ok(found)
    }
}
