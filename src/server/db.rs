use crate::telemetry::Sample;
use chrono::Local;
use thiserror::Error;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub type Time = chrono::DateTime<Local>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sample database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("sample database lock poisoned")]
    Poisoned,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS samples (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    series TEXT NOT NULL,
    time   REAL NOT NULL,
    value  REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS samples_by_series ON samples (series, id);";

/// Every dataset the dashboard has been fed, one row per sample.
///
/// Rows come back in insertion order, which is the dataset's append order;
/// nothing here sorts by time.
pub struct DatabaseCtx {
    // Rusqlite connections aren't Sync.
    samples_db: Mutex<rusqlite::Connection>,

    start_time: Time,
}

impl DatabaseCtx {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(rusqlite::Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(rusqlite::Connection::open_in_memory()?)
    }

    fn with_connection(connection: rusqlite::Connection) -> Result<Self, StoreError> {
        connection.execute_batch(SCHEMA)?;

        Ok(Self {
            start_time: Local::now(),
            samples_db: Mutex::new(connection),
        })
    }

    pub fn start_time(&self) -> Time {
        self.start_time
    }

    pub fn uptime(&self) -> chrono::TimeDelta {
        Local::now() - self.start_time
    }

    fn db(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, StoreError> {
        self.samples_db.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Appends `samples` to `series` atomically.
    pub fn submit_samples(&self, series: &str, samples: &[Sample]) -> Result<(), StoreError> {
        let mut db = self.db()?;
        let tx = db.transaction()?;
        {
            let mut stmt = tx.prepare_cached("INSERT INTO samples (series, time, value) VALUES (?1, ?2, ?3)")?;
            for sample in samples {
                stmt.execute(rusqlite::params![series, sample.time, sample.value])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    pub fn get_series(&self, series: &str) -> Result<Vec<Sample>, StoreError> {
        let db = self.db()?;
        let mut stmt = db.prepare_cached("SELECT time, value FROM samples WHERE series = ?1 ORDER BY id")?;

        let rows = stmt.query_map([series], |row| Ok(Sample::new(row.get::<_, f64>(0)?, row.get::<_, f64>(1)?)))?;
        let samples = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(samples)
    }

    pub fn series_names(&self) -> Result<Vec<String>, StoreError> {
        let db = self.db()?;
        let mut stmt = db.prepare_cached("SELECT DISTINCT series FROM samples ORDER BY series")?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }
}
