//! Local persistence for raw launches and their aggregates.
//!
//! Everything lives in one SQLite file:
//!
//! ```text
//! raw_launches       # id -> launch JSON, insert-only
//! launch_aggregates  # one summary row, id = 1
//! ```
//!
//! Each operation opens its own connection and transaction. Nothing is held
//! open between operations, so a failed insert never undoes earlier ones.

mod aggregate;
mod raw;

use std::path::PathBuf;

use jiff::Timestamp;
use rusqlite::{Connection, Transaction};

use crate::model::{AggregateRow, LaunchRecord};

/// Table definitions, applied idempotently by [`Storage::ensure_schema`].
const SCHEMA: &str = include_str!("storage/schema.sql");

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not open database at {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("could not apply schema: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// What happened to a single insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,

    /// A row with this id already existed and was left untouched.
    AlreadyPresent,
}

/// The persistence operations an ingestion run needs.
pub trait LaunchStore {
    /// Create both tables if they are missing.
    fn ensure_schema(&self) -> Result<()>;

    /// The latest `date_utc` among persisted launches, read from committed state.
    fn latest_watermark(&self) -> Result<Option<Timestamp>>;

    /// Insert a launch unless its id is already stored. Never overwrites.
    fn insert(&self, launch: &LaunchRecord) -> Result<InsertOutcome>;

    /// Rebuild the aggregate row from every persisted launch.
    fn recompute_aggregates(&self) -> Result<AggregateRow>;
}

/// SQLite-backed launch storage.
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Creates a storage handle for the database file at `path`.
    ///
    /// Nothing is opened until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates `raw_launches` and `launch_aggregates` if they don't exist.
    pub fn ensure_schema(&self) -> Result<()> {
        log::info!("Ensuring 'raw_launches' and 'launch_aggregates' tables exist...");
        self.in_transaction(|tx| tx.execute_batch(SCHEMA).map_err(StorageError::Schema))?;
        log::info!("Tables are ready.");
        Ok(())
    }

    /// Runs `op` inside a fresh connection and transaction.
    ///
    /// Commits when `op` succeeds. On any error the transaction is dropped
    /// uncommitted, which rolls it back, and the connection closes.
    fn in_transaction<T>(&self, op: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        match op(&tx) {
            Ok(value) => {
                tx.commit()?;
                log::debug!("Transaction committed.");
                Ok(value)
            }
            Err(e) => {
                drop(tx);
                log::warn!("Transaction rolled back: {e}");
                Err(e)
            }
        }
    }

    fn connect(&self) -> Result<Connection> {
        log::debug!("Opening database at {}", self.path.display());
        Connection::open(&self.path).map_err(|source| {
            log::error!("Database connection error: {source}");
            StorageError::Connect {
                path: self.path.clone(),
                source,
            }
        })
    }
}

impl LaunchStore for Storage {
    fn ensure_schema(&self) -> Result<()> {
        Storage::ensure_schema(self)
    }

    fn latest_watermark(&self) -> Result<Option<Timestamp>> {
        Storage::latest_watermark(self)
    }

    fn insert(&self, launch: &LaunchRecord) -> Result<InsertOutcome> {
        Storage::insert(self, launch)
    }

    fn recompute_aggregates(&self) -> Result<AggregateRow> {
        Storage::recompute_aggregates(self)
    }
}
