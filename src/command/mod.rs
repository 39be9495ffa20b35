//! Operator commands: up, down, redo, status, create and force.
//!
//! Each command is a variant of [`Command`] dispatched with a plain `match`.
//! Output meant for the operator is written to the supplied writer.

use crate::config::{ConfigError, DbConf};
use crate::migration::{MigrationError, MigrationExecutor, MigrationRegistry, MigrationReport, MigrationStatus};
use crate::template::{create_migration, TemplateError};
use crate::utils::STATUS_TIME_LAYOUT;
use clap::Subcommand;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Migration error: {0}")]
    MigrationError(#[from] MigrationError),

    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply pending migrations (all by default)
    Up {
        /// Number of migrations to apply
        count: Option<usize>,
    },
    /// Roll back applied migrations (one by default)
    Down {
        /// Number of migrations to roll back
        count: Option<usize>,
    },
    /// Roll back then re-apply migrations (one by default)
    Redo {
        /// Number of migrations to redo
        count: Option<usize>,
    },
    /// Show the applied state of every migration
    Status,
    /// Generate a new migration source file
    Create {
        /// Migration name, letters, digits and underscores
        name: String,
    },
    /// Mark a migration applied without running it
    Force {
        /// Version to mark applied
        version: i64,
    },
}

/// Run `command` against the database described by `conf`.
///
/// Returns the number of migrations that failed. Failed migrations do not
/// make the command itself fail.
pub async fn execute<W: Write>(
    command: Command,
    conf: &DbConf,
    registry: Arc<MigrationRegistry>,
    out: &mut W,
) -> Result<usize, CommandError> {
    if let Command::Create { name } = &command {
        let path = create_migration(name, &conf.migrations_dir).await?;
        writeln!(out, "goose: created {}", path.display())?;
        return Ok(0);
    }

    let conn = conf.open_connection()?;
    let mut executor = MigrationExecutor::new(registry, conn, conf.dialect()?)?;

    let failed = match command {
        Command::Up { count } => {
            let report = executor.up(count)?;
            write_report(out, &conf.env, &report)?
        }
        Command::Down { count } => {
            let report = executor.down(count)?;
            write_report(out, &conf.env, &report)?
        }
        Command::Redo { count } => {
            let (down, up) = executor.redo(count)?;
            write_report(out, &conf.env, &down)? + write_report(out, &conf.env, &up)?
        }
        Command::Status => {
            let statuses = executor.status()?;
            write_status(out, &conf.env, &statuses)?;
            0
        }
        Command::Force { version } => {
            executor.force(version)?;
            writeln!(
                out,
                "goose: forced version {}, current version: {}",
                version,
                executor.current_version()
            )?;
            0
        }
        Command::Create { .. } => 0,
    };

    Ok(failed)
}

/// Print a run report. Returns the number of failed migrations.
pub fn write_report<W: Write>(
    out: &mut W,
    env: &str,
    report: &MigrationReport,
) -> std::io::Result<usize> {
    if report.nothing_to_do() {
        writeln!(
            out,
            "goose: no migrations to run. current version: {}",
            report.current_version
        )?;
        return Ok(0);
    }

    writeln!(
        out,
        "goose: migrating db environment '{}', current version: {}, direction: {}",
        env, report.starting_version, report.direction
    )?;
    for outcome in &report.outcomes {
        writeln!(out, "{}", outcome)?;
    }

    Ok(report.failures().count())
}

/// Print the status table
pub fn write_status<W: Write>(
    out: &mut W,
    env: &str,
    statuses: &[MigrationStatus],
) -> std::io::Result<()> {
    writeln!(out, "goose: status for environment '{}'", env)?;
    writeln!(out, "    Applied At                  Migration")?;
    writeln!(out, "    {}", "=".repeat(80))?;

    for status in statuses {
        let applied_at = match &status.applied_at {
            Some(ts) => ts.format(STATUS_TIME_LAYOUT).to_string(),
            None => "Pending".to_string(),
        };
        writeln!(
            out,
            "    {:<24}   --   {}_{}",
            applied_at, status.version, status.name
        )?;
    }

    Ok(())
}
