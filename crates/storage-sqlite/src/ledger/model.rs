//! Database models for deposits and transactions.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use abacus_core::errors::Error;
use abacus_core::ledger::{Deposit, Transaction};

use crate::utils::parse_decimal;

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::deposits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DepositDB {
    pub id: String,
    pub portfolio_id: String,
    pub amount: String,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub portfolio_id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub transaction_type: String,
    pub value: String,
    pub quantity: String,
    pub price: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<DepositDB> for Deposit {
    type Error = Error;

    fn try_from(db: DepositDB) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: parse_decimal(&db.amount, "deposits.amount")?,
            id: db.id,
            portfolio_id: db.portfolio_id,
            date: db.date,
            created_at: db.created_at,
        })
    }
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = Error;

    fn try_from(db: TransactionDB) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction_type: db.transaction_type.parse()?,
            value: parse_decimal(&db.value, "transactions.value")?,
            quantity: parse_decimal(&db.quantity, "transactions.quantity")?,
            price: parse_decimal(&db.price, "transactions.price")?,
            id: db.id,
            portfolio_id: db.portfolio_id,
            asset_id: db.asset_id,
            date: db.date,
            created_at: db.created_at,
        })
    }
}
