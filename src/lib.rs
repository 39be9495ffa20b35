pub mod cli;
pub mod command;
pub mod config;
pub mod dialect;
pub mod migration;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use cli::{run_cli, Cli};
pub use command::{execute, Command, CommandError};
pub use config::{read_db_conf, ConfigError, DbConf, Driver};
pub use dialect::{dialect_for_driver, Dialect, SqliteDialect, VersionTableState};
pub use migration::{
    collect_migrations, Migration, MigrationDirection, MigrationError, MigrationExecutor,
    MigrationOutcome, MigrationRegistry, MigrationReport, MigrationStatus, OutcomeStatus,
    VersionRecord, RUN_ALL,
};
pub use template::{create_migration, TemplateError};
