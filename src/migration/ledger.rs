//! Reads and appends to the version ledger table.
//!
//! The ledger is append-only. The state of a version is decided by its most
//! recent row, where recency is the autoincrement `id`, not the timestamp.

use super::types::{AppliedLookup, MigrationError, VersionRecord};
use crate::dialect::{Dialect, VersionTableState};
use crate::utils::{parse_db_timestamp, VERSION_TABLE};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use tracing::{debug, info};

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, i64, String, bool)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn to_record(raw: (i64, i64, String, bool)) -> Result<VersionRecord, MigrationError> {
    let (id, version_id, tstamp, is_applied) = raw;
    let timestamp =
        parse_db_timestamp(&tstamp).ok_or(MigrationError::InvalidTimestamp(tstamp))?;
    Ok(VersionRecord {
        id,
        version_id,
        timestamp,
        is_applied,
    })
}

fn query_records(conn: &Connection, sql: &str) -> Result<Vec<VersionRecord>, MigrationError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(to_record).collect()
}

/// Create the ledger table and seed it with an applied version 0.
pub fn create_version_table(
    conn: &mut Connection,
    dialect: &dyn Dialect,
) -> Result<(), MigrationError> {
    let tx = conn.transaction()?;
    tx.execute(&dialect.create_version_table_sql(), [])?;
    tx.execute(&dialect.insert_version_sql(), params![0_i64, true])?;
    tx.commit()?;

    info!(table = VERSION_TABLE, "Created version table");
    Ok(())
}

/// Every ledger record, most recent first.
pub fn version_records(
    conn: &Connection,
    dialect: &dyn Dialect,
) -> Result<Vec<VersionRecord>, MigrationError> {
    query_records(conn, &dialect.version_records_sql())
}

/// Resolve the current version from a newest-first list of records.
///
/// A version whose latest record is a rollback is superseded: older
/// "applied" rows for it are ignored.
pub fn resolve_current_version(records: &[VersionRecord]) -> Result<i64, MigrationError> {
    let mut superseded: HashSet<i64> = HashSet::new();

    for record in records {
        if superseded.contains(&record.version_id) {
            continue;
        }
        if record.is_applied {
            return Ok(record.version_id);
        }
        superseded.insert(record.version_id);
    }

    Err(MigrationError::LedgerCorrupt)
}

/// Return the current version, creating the ledger table if absent.
pub fn ensure_current_version(
    conn: &mut Connection,
    dialect: &dyn Dialect,
) -> Result<i64, MigrationError> {
    if dialect.detect_version_table(conn)? == VersionTableState::Missing {
        create_version_table(conn, dialect)?;
        return Ok(0);
    }

    let records = version_records(conn, dialect)?;
    let current = resolve_current_version(&records)?;
    debug!(current_version = current, "Resolved current version");
    Ok(current)
}

/// Versions whose most recent record is applied, keyed to that record's time.
///
/// The seed record for version 0 is included; callers look up registered
/// versions only.
pub fn applied_migrations_lookup(
    conn: &Connection,
    dialect: &dyn Dialect,
) -> Result<AppliedLookup, MigrationError> {
    let latest = query_records(conn, &dialect.latest_version_records_sql())?;
    Ok(latest
        .into_iter()
        .filter(|r| r.is_applied)
        .map(|r| (r.version_id, r.timestamp))
        .collect())
}

/// Append a ledger record. Pass a transaction to commit it together with a
/// migration's own changes.
pub fn insert_version_record(
    conn: &Connection,
    dialect: &dyn Dialect,
    version: i64,
    is_applied: bool,
) -> Result<(), MigrationError> {
    conn.execute(&dialect.insert_version_sql(), params![version, is_applied])?;
    Ok(())
}
