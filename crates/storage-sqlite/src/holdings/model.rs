//! Database model for holdings.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use abacus_core::errors::Error;
use abacus_core::holdings::Holding;

use crate::utils::parse_decimal;

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HoldingDB {
    pub id: String,
    pub portfolio_id: String,
    pub asset_id: String,
    pub quantity: String,
    pub weight: String,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<HoldingDB> for Holding {
    type Error = Error;

    fn try_from(db: HoldingDB) -> Result<Self, Self::Error> {
        Ok(Self {
            quantity: parse_decimal(&db.quantity, "holdings.quantity")?,
            weight: parse_decimal(&db.weight, "holdings.weight")?,
            id: db.id,
            portfolio_id: db.portfolio_id,
            asset_id: db.asset_id,
            updated_at: db.updated_at,
        })
    }
}

impl From<&Holding> for HoldingDB {
    fn from(holding: &Holding) -> Self {
        Self {
            id: holding.id.clone(),
            portfolio_id: holding.portfolio_id.clone(),
            asset_id: holding.asset_id.clone(),
            quantity: holding.quantity.to_string(),
            weight: holding.weight.to_string(),
            updated_at: holding.updated_at,
        }
    }
}
