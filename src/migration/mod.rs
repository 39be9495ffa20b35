//! Migration engine.
//!
//! This module tracks which migrations have been applied to a database and
//! drives them forward or backward.
//!
//! # Overview
//!
//! - Migrations are registered in a `MigrationRegistry`, keyed by version
//! - The version ledger (`goose_db_version`) is an append-only history of
//!   every apply and rollback; the latest row per version decides its state
//! - `collect_migrations` plans which migrations a run executes
//! - The `MigrationExecutor` runs each planned migration in its own
//!   transaction, together with its ledger entry
//! - A failing migration is rolled back and reported; the rest of the plan
//!   still runs
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = MigrationRegistry::new();
//! registry.register(1, "create_users", up, down)?;
//! let mut executor = MigrationExecutor::new(Arc::new(registry), conn, dialect)?;
//! let report = executor.up(None)?;
//! ```

mod executor;
pub mod ledger;
mod planner;
mod registry;
mod types;

pub use executor::{MigrationExecutor, RUN_ALL};
pub use planner::collect_migrations;
pub use registry::MigrationRegistry;
pub use types::{
    AppliedLookup, Migration, MigrationDirection, MigrationError, MigrationFn, MigrationOutcome,
    MigrationReport, MigrationStatus, OutcomeStatus, VersionRecord,
};
