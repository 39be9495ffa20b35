//! SQL dialects for the version ledger table.
//!
//! The engine never writes ledger SQL itself. Each supported database
//! engine provides a [`Dialect`] that knows how to detect, create, read and
//! append to the `goose_db_version` table.

mod sqlite;

pub use sqlite::SqliteDialect;

use crate::config::ConfigError;
use rusqlite::Connection;

/// Whether the ledger table is present in the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionTableState {
    Exists,
    Missing,
}

/// Per-engine SQL strategy for ledger operations.
pub trait Dialect: Send + Sync {
    /// Driver name this dialect answers to.
    fn name(&self) -> &'static str;

    /// Check whether the ledger table exists.
    fn detect_version_table(&self, conn: &Connection) -> rusqlite::Result<VersionTableState>;

    /// Statement creating the ledger table.
    fn create_version_table_sql(&self) -> String;

    /// Query returning `(id, version_id, tstamp, is_applied)` for every
    /// record, most recent first.
    fn version_records_sql(&self) -> String;

    /// Query returning `(id, version_id, tstamp, is_applied)` for only the
    /// most recent record of each version.
    fn latest_version_records_sql(&self) -> String;

    /// Statement appending a record. Parameters: `version_id`, `is_applied`.
    fn insert_version_sql(&self) -> String;
}

/// Select the dialect for a configured driver name.
pub fn dialect_for_driver(driver: &str) -> Result<Box<dyn Dialect>, ConfigError> {
    match driver {
        "sqlite3" | "sqlite" => Ok(Box::new(SqliteDialect)),
        other => Err(ConfigError::UnsupportedDriver(other.to_string())),
    }
}
