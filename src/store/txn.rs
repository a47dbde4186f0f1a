use std::str::FromStr;

use chrono::naive::NaiveDate;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use ulid::Ulid;

use super::{Result, SqliteStore};
use crate::core::Transaction;

pub struct Store<'a>(&'a SqliteStore);

impl<'a> Store<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self(store)
    }

    pub async fn save(&self, txn: &Transaction) -> Result<()> {
        sqlx::query(
            "INSERT INTO transactions (
                id,
                recipient,
                bank,
                account_type,
                account_number,
                date,
                time,
                transaction_code,
                amount,
                status,
                origin,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(txn.id.to_string())
        .bind(&txn.recipient)
        .bind(&txn.bank)
        .bind(&txn.account_type)
        .bind(&txn.account_number)
        .bind(txn.date)
        .bind(&txn.time)
        .bind(&txn.code)
        .bind(txn.amount)
        .bind(txn.status.to_string())
        .bind(txn.origin.to_string())
        .bind(txn.created_at)
        .execute(&mut *self.0.conn.acquire().await?)
        .await?;

        Ok(())
    }

    /// All transactions, newest first. Ordering is for display only.
    pub async fn list(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT id, recipient, bank, account_type, account_number, date,
                time, transaction_code, amount, status, origin, created_at
            FROM transactions ORDER BY created_at DESC",
        )
        .fetch_all(&mut *self.0.conn.acquire().await?)
        .await?;

        rows.into_iter().map(from_row).collect()
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.0.conn.acquire().await?)
            .await?;

        Ok(())
    }
}

fn from_row(row: SqliteRow) -> Result<Transaction> {
    Ok(Transaction {
        id: Ulid::from_str(row.try_get("id")?)?,
        recipient: row.try_get("recipient")?,
        bank: row.try_get("bank")?,
        account_type: row.try_get("account_type")?,
        account_number: row.try_get("account_number")?,
        date: row.try_get::<NaiveDate, _>("date")?,
        time: row.try_get("time")?,
        code: row.try_get("transaction_code")?,
        amount: row.try_get("amount")?,
        status: row.try_get::<String, _>("status")?.into(),
        origin: row.try_get::<String, _>("origin")?.into(),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
