//! Types for the migration system.

use chrono::{DateTime, Utc};
use rusqlite::Transaction;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error types for migration operations.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("More than one migration specified for version {0}")]
    DuplicateVersion(i64),

    #[error("Invalid migration version {0}: versions must be positive")]
    InvalidVersion(i64),

    #[error("No migration registered for version {0}")]
    UnknownVersion(i64),

    #[error("Version ledger is corrupt: no applied version could be resolved")]
    LedgerCorrupt,

    #[error("Invalid ledger timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Body of one migration direction, run inside its own transaction.
pub type MigrationFn =
    Arc<dyn Fn(&Transaction<'_>) -> Result<(), MigrationError> + Send + Sync>;

/// A paired forward/backward schema change identified by its version.
#[derive(Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up: MigrationFn,
    pub down: MigrationFn,
}

impl Migration {
    /// Body to run for `direction`.
    pub fn body(&self, direction: MigrationDirection) -> &MigrationFn {
        match direction {
            MigrationDirection::Up => &self.up,
            MigrationDirection::Down => &self.down,
        }
    }

    /// `<version>_<name>`, as shown in reports and status output.
    pub fn label(&self) -> String {
        format!("{}_{}", self.version, self.name)
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Direction of migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    /// Apply pending migrations.
    Up,
    /// Roll back applied migrations.
    Down,
}

impl MigrationDirection {
    /// Value written to `is_applied` for a successful run in this direction.
    pub fn is_applied(&self) -> bool {
        matches!(self, MigrationDirection::Up)
    }
}

impl fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationDirection::Up => write!(f, "UP"),
            MigrationDirection::Down => write!(f, "DOWN"),
        }
    }
}

/// One row of the version ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub id: i64,
    pub version_id: i64,
    pub timestamp: DateTime<Utc>,
    pub is_applied: bool,
}

/// Versions whose most recent ledger record marks them applied, with the
/// time of that record.
pub type AppliedLookup = HashMap<i64, DateTime<Utc>>;

/// Outcome of a single migration within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Ok,
    Failed(String),
}

/// Result of attempting one migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub version: i64,
    pub name: String,
    pub status: OutcomeStatus,
}

impl MigrationOutcome {
    pub fn is_ok(&self) -> bool {
        self.status == OutcomeStatus::Ok
    }
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            OutcomeStatus::Ok => write!(f, "OK     {}_{}", self.version, self.name),
            OutcomeStatus::Failed(error) => {
                write!(f, "FAIL   {}_{}     {}", self.version, self.name, error)
            }
        }
    }
}

/// Report of one `run` invocation.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub direction: MigrationDirection,
    /// Current version before the run started.
    pub starting_version: i64,
    /// Current version after the run finished.
    pub current_version: i64,
    /// One entry per planned migration, in execution order.
    pub outcomes: Vec<MigrationOutcome>,
}

impl MigrationReport {
    /// True when the plan was empty.
    pub fn nothing_to_do(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MigrationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// Versions that ran successfully, in execution order.
    pub fn succeeded(&self) -> Vec<i64> {
        self.outcomes
            .iter()
            .filter(|o| o.is_ok())
            .map(|o| o.version)
            .collect()
    }
}

/// Applied state of one registered migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub name: String,
    /// `None` while pending.
    pub applied_at: Option<DateTime<Utc>>,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}
