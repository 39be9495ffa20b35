use super::{Dialect, VersionTableState};
use crate::utils::VERSION_TABLE;
use rusqlite::{Connection, OptionalExtension};

/// SQLite ledger statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn detect_version_table(&self, conn: &Connection) -> rusqlite::Result<VersionTableState> {
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [VERSION_TABLE],
                |row| row.get(0),
            )
            .optional()?;

        Ok(match found {
            Some(_) => VersionTableState::Exists,
            None => VersionTableState::Missing,
        })
    }

    fn create_version_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {VERSION_TABLE} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version_id INTEGER NOT NULL,
                is_applied INTEGER NOT NULL,
                tstamp TIMESTAMP DEFAULT (datetime('now'))
            )"
        )
    }

    fn version_records_sql(&self) -> String {
        format!("SELECT id, version_id, tstamp, is_applied FROM {VERSION_TABLE} ORDER BY id DESC")
    }

    fn latest_version_records_sql(&self) -> String {
        format!(
            "SELECT id, version_id, tstamp, is_applied FROM {VERSION_TABLE}
             WHERE id IN (SELECT MAX(id) FROM {VERSION_TABLE} GROUP BY version_id)
             ORDER BY id DESC"
        )
    }

    fn insert_version_sql(&self) -> String {
        format!("INSERT INTO {VERSION_TABLE} (version_id, is_applied) VALUES (?1, ?2)")
    }
}
