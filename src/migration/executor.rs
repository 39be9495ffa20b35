//! Migration executor for running migrations.

use super::ledger::{
    applied_migrations_lookup, ensure_current_version, insert_version_record,
};
use super::planner::collect_migrations;
use super::registry::MigrationRegistry;
use super::types::{
    Migration, MigrationDirection, MigrationError, MigrationOutcome, MigrationReport,
    MigrationStatus, OutcomeStatus,
};
use crate::dialect::Dialect;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Run count meaning "every eligible migration".
pub const RUN_ALL: usize = 0;

/// Executor for running migrations against one database.
///
/// The executor takes a registry of migrations, a connection and the
/// dialect for that connection. Construction resolves the current version
/// and creates the ledger table if needed.
pub struct MigrationExecutor {
    registry: Arc<MigrationRegistry>,
    conn: Connection,
    dialect: Box<dyn Dialect>,
    current_version: i64,
}

impl MigrationExecutor {
    /// Create a new executor, bootstrapping the ledger if absent.
    pub fn new(
        registry: Arc<MigrationRegistry>,
        mut conn: Connection,
        dialect: Box<dyn Dialect>,
    ) -> Result<Self, MigrationError> {
        let current_version = ensure_current_version(&mut conn, dialect.as_ref())?;
        Ok(Self {
            registry,
            conn,
            dialect,
            current_version,
        })
    }

    /// Version resolved at construction or after the last run.
    pub fn current_version(&self) -> i64 {
        self.current_version
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Apply pending migrations. `None` applies all of them.
    pub fn up(&mut self, run_count: Option<usize>) -> Result<MigrationReport, MigrationError> {
        self.run(MigrationDirection::Up, run_count.unwrap_or(RUN_ALL))
    }

    /// Roll back applied migrations. `None` rolls back one.
    pub fn down(&mut self, run_count: Option<usize>) -> Result<MigrationReport, MigrationError> {
        self.run(MigrationDirection::Down, run_count.unwrap_or(1))
    }

    /// Roll back then re-apply. `None` redoes one.
    pub fn redo(
        &mut self,
        run_count: Option<usize>,
    ) -> Result<(MigrationReport, MigrationReport), MigrationError> {
        let count = run_count.unwrap_or(1);
        let down = self.run(MigrationDirection::Down, count)?;
        let up = self.run(MigrationDirection::Up, count)?;
        Ok((down, up))
    }

    /// Execute the plan for `direction`.
    ///
    /// Every planned migration is attempted. A failure rolls back that
    /// migration's transaction and is recorded in the report; the run moves
    /// on to the next one.
    pub fn run(
        &mut self,
        direction: MigrationDirection,
        run_count: usize,
    ) -> Result<MigrationReport, MigrationError> {
        let applied = applied_migrations_lookup(&self.conn, self.dialect.as_ref())?;
        let plan = collect_migrations(&self.registry, &applied, direction, run_count);
        let starting_version = self.current_version;

        if plan.is_empty() {
            info!(
                current_version = starting_version,
                "No migrations to run"
            );
            return Ok(MigrationReport {
                direction,
                starting_version,
                current_version: starting_version,
                outcomes: vec![],
            });
        }

        info!(
            current_version = starting_version,
            direction = %direction,
            count = plan.len(),
            "Starting migration run"
        );

        let mut outcomes = Vec::with_capacity(plan.len());
        for migration in &plan {
            let status = match self.run_one(migration, direction) {
                Ok(()) => {
                    info!(migration = %migration.label(), direction = %direction, "Migration applied");
                    OutcomeStatus::Ok
                }
                Err(e) => {
                    error!(migration = %migration.label(), error = %e, "Migration failed");
                    OutcomeStatus::Failed(e.to_string())
                }
            };
            outcomes.push(MigrationOutcome {
                version: migration.version,
                name: migration.name.clone(),
                status,
            });
        }

        self.current_version = ensure_current_version(&mut self.conn, self.dialect.as_ref())?;

        let report = MigrationReport {
            direction,
            starting_version,
            current_version: self.current_version,
            outcomes,
        };

        let failed = report.failures().count();
        if failed > 0 {
            warn!(failed, total = report.outcomes.len(), "Migration run finished with failures");
        } else {
            info!(
                current_version = self.current_version,
                count = report.outcomes.len(),
                "Migration run completed successfully"
            );
        }

        Ok(report)
    }

    /// Run one migration body and its ledger append in a single transaction.
    fn run_one(
        &mut self,
        migration: &Migration,
        direction: MigrationDirection,
    ) -> Result<(), MigrationError> {
        let tx = self.conn.transaction()?;

        // Dropping `tx` on an early return rolls it back
        (migration.body(direction))(&tx)?;
        insert_version_record(
            &tx,
            self.dialect.as_ref(),
            migration.version,
            direction.is_applied(),
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Mark a registered version applied without running its body.
    pub fn force(&mut self, version: i64) -> Result<(), MigrationError> {
        let migration = self
            .registry
            .get(version)
            .ok_or(MigrationError::UnknownVersion(version))?;

        insert_version_record(&self.conn, self.dialect.as_ref(), version, true)?;
        warn!(migration = %migration.label(), "Forced migration version");

        self.current_version = ensure_current_version(&mut self.conn, self.dialect.as_ref())?;
        Ok(())
    }

    /// Applied state of every registered migration, ascending by version.
    pub fn status(&self) -> Result<Vec<MigrationStatus>, MigrationError> {
        let applied = applied_migrations_lookup(&self.conn, self.dialect.as_ref())?;
        Ok(self
            .registry
            .iter()
            .map(|m| MigrationStatus {
                version: m.version,
                name: m.name.clone(),
                applied_at: applied.get(&m.version).copied(),
            })
            .collect())
    }
}
