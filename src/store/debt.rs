use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use ulid::Ulid;

use super::{Result, SqliteStore};
use crate::core::Debt;

pub struct Store<'a>(&'a SqliteStore);

impl<'a> Store<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self(store)
    }

    pub async fn save(&self, debt: &Debt) -> Result<()> {
        sqlx::query(
            "INSERT INTO debts (id, name, total_amount, keywords, created_at)
            VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(debt.id.to_string())
        .bind(&debt.name)
        .bind(debt.total_amount)
        .bind(&debt.keywords)
        .bind(debt.created_at)
        .execute(&mut *self.0.conn.acquire().await?)
        .await?;

        Ok(())
    }

    /// All debts, oldest first.
    pub async fn list(&self) -> Result<Vec<Debt>> {
        let rows = sqlx::query(
            "SELECT id, name, total_amount, keywords, created_at
            FROM debts ORDER BY created_at ASC",
        )
        .fetch_all(&mut *self.0.conn.acquire().await?)
        .await?;

        rows.into_iter().map(from_row).collect()
    }

    pub async fn update(&self, debt: &Debt) -> Result<()> {
        sqlx::query(
            "UPDATE debts SET name = $1, total_amount = $2, keywords = $3
            WHERE id = $4",
        )
        .bind(&debt.name)
        .bind(debt.total_amount)
        .bind(&debt.keywords)
        .bind(debt.id.to_string())
        .execute(&mut *self.0.conn.acquire().await?)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM debts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.0.conn.acquire().await?)
            .await?;

        Ok(())
    }
}

fn from_row(row: SqliteRow) -> Result<Debt> {
    Ok(Debt {
        id: Ulid::from_str(row.try_get("id")?)?,
        name: row.try_get("name")?,
        total_amount: row.try_get("total_amount")?,
        keywords: row.try_get("keywords")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
