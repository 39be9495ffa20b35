#![allow(dead_code)]

use goose_migrate::{
    DbConf, Driver, MigrationError, MigrationExecutor, MigrationRegistry, SqliteDialect,
};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Executor over a fresh in-memory database
pub fn memory_executor(registry: MigrationRegistry) -> MigrationExecutor {
    let conn = Connection::open_in_memory().expect("Should open in-memory database");
    MigrationExecutor::new(Arc::new(registry), conn, Box::new(SqliteDialect))
        .expect("Should create executor")
}

/// Configuration pointing at a sqlite file inside `dir`
pub fn sqlite_conf(dir: &Path) -> DbConf {
    DbConf {
        env: "test".to_string(),
        migrations_dir: dir.join("migrations"),
        driver: Driver {
            name: "sqlite3".to_string(),
            open: dir.join("test.sqlite3").to_string_lossy().to_string(),
        },
    }
}

/// Migration pair that creates and drops `table`
pub fn register_table(registry: &mut MigrationRegistry, version: i64, table: &'static str) {
    registry
        .register(
            version,
            format!("create_{}", table),
            move |tx: &Transaction<'_>| {
                tx.execute_batch(&format!("CREATE TABLE {} (id INTEGER PRIMARY KEY)", table))?;
                Ok(())
            },
            move |tx: &Transaction<'_>| {
                tx.execute_batch(&format!("DROP TABLE {}", table))?;
                Ok(())
            },
        )
        .expect("Should register migration");
}

/// Migration pair that always fails
pub fn register_failing(registry: &mut MigrationRegistry, version: i64) {
    registry
        .register(
            version,
            "always_fails",
            |_tx: &Transaction<'_>| Err(MigrationError::MigrationFailed("boom".to_string())),
            |_tx: &Transaction<'_>| Err(MigrationError::MigrationFailed("boom".to_string())),
        )
        .expect("Should register migration");
}

pub fn table_exists(conn: &Connection, table: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .expect("Should query sqlite_master")
        > 0
}

/// Versions currently marked applied, ascending, excluding the seed record
pub fn applied_versions(executor: &MigrationExecutor) -> Vec<i64> {
    executor
        .status()
        .expect("Should read status")
        .into_iter()
        .filter(|s| s.is_applied())
        .map(|s| s.version)
        .collect()
}

pub fn ledger_rows_for(conn: &Connection, version: i64) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM goose_db_version WHERE version_id = ?1",
        [version],
        |row| row.get(0),
    )
    .expect("Should count ledger rows")
}
