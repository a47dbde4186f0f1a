mod debt;
mod txn;

use std::sync::Arc;

use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Database(#[from] SqlxError),
    #[error(transparent)]
    Decode(#[from] ulid::DecodeError),
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        self.to_string() == other.to_string()
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

pub struct SqliteStore {
    conn: Arc<sqlx::pool::Pool<sqlx::sqlite::Sqlite>>,
}

impl SqliteStore {
    pub async fn new(uri: &str) -> Result<Self> {
        // Writes are independent single-row inserts; one connection is
        // enough and keeps in-memory databases coherent.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect(uri)
            .await?;

        let mut conn = pool.acquire().await?;
        sqlx::migrate!("./migrations").run(&mut conn).await?;

        Ok(Self {
            conn: Arc::new(pool),
        })
    }

    /// Opens (creating if needed) the database file at `path`, making
    /// sure the parent directory exists first.
    pub async fn open_file(path: &str) -> Result<Self> {
        if let Some(dir) = std::path::Path::new(path).parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(anyhow::Error::from)?;
            }
        }

        Self::new(&format!("sqlite://{}?mode=rwc", path)).await
    }

    pub fn txns(&self) -> txn::Store {
        txn::Store::new(self)
    }

    pub fn debts(&self) -> debt::Store {
        debt::Store::new(self)
    }
}
