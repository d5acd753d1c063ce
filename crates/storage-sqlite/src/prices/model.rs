//! Database model for prices.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use abacus_core::errors::Error;
use abacus_core::prices::Price;

use crate::utils::parse_decimal;

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::prices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceDB {
    pub id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub price: String,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<PriceDB> for Price {
    type Error = Error;

    fn try_from(db: PriceDB) -> Result<Self, Self::Error> {
        Ok(Self {
            price: parse_decimal(&db.price, "prices.price")?,
            id: db.id,
            asset_id: db.asset_id,
            date: db.date,
            updated_at: db.updated_at,
        })
    }
}
