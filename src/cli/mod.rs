//! Command-line entry point.
//!
//! Migrations are Rust code, so each project builds its own `goose` binary:
//!
//! ```ignore
//! mod migrations;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut registry = MigrationRegistry::new();
//!     migrations::m20140406181655_add_users::register(&mut registry)?;
//!     goose_migrate::cli::run_cli(registry).await
//! }
//! ```

use crate::command::{execute, Command};
use crate::config::read_db_conf;
use crate::migration::MigrationRegistry;
use crate::utils::{DEFAULT_DB_PATH, DEFAULT_ENV};
use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Goose - versioned database migrations
#[derive(Parser, Debug)]
#[command(name = "goose", author, version, about, long_about = None)]
pub struct Cli {
    /// Environment to select from the db config
    #[arg(short, long, global = true, env = "GOOSE_ENV", default_value = DEFAULT_ENV)]
    pub env: String,

    /// Directory containing dbconf.yml or dbconf.json
    #[arg(short, long, global = true, env = "GOOSE_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Parse the process arguments and run the command against `registry`.
///
/// Exits the process with status 1 when any migration failed.
pub async fn run_cli(registry: MigrationRegistry) -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let failed = run(cli, registry, &mut stdout).await?;

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Load the configuration named by `cli` and execute its command.
/// Returns the number of failed migrations.
pub async fn run<W: Write>(
    cli: Cli,
    registry: MigrationRegistry,
    out: &mut W,
) -> anyhow::Result<usize> {
    let conf = read_db_conf(&cli.path, &cli.env)
        .await
        .with_context(|| format!("couldn't load db config from {}", cli.path.display()))?;

    let failed = execute(cli.command, &conf, Arc::new(registry), out).await?;
    Ok(failed)
}

/// Install the fmt subscriber; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    // Ignore the error when the embedding binary already set a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counts_and_globals() {
        let cli = Cli::try_parse_from(["goose", "--env", "test", "-p", "db2", "down", "2"]).unwrap();
        assert_eq!(cli.env, "test");
        assert_eq!(cli.path, PathBuf::from("db2"));
        assert_eq!(cli.command, Command::Down { count: Some(2) });
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["goose", "up"]).unwrap();
        assert_eq!(cli.command, Command::Up { count: None });
        assert_eq!(cli.path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn test_parse_force_and_create() {
        let cli = Cli::try_parse_from(["goose", "force", "20140406181655"]).unwrap();
        assert_eq!(cli.command, Command::Force { version: 20140406181655 });

        let cli = Cli::try_parse_from(["goose", "create", "add_users"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Create {
                name: "add_users".to_string()
            }
        );
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["goose"]).is_err());
    }
}
