use goose_migrate::cli::run_cli;
use goose_migrate::MigrationRegistry;

/// Stock binary with no compiled-in migrations.
///
/// It can scaffold migrations (`create`) and inspect or bootstrap the
/// ledger. Projects run their migrations from their own binary that
/// registers them and calls `run_cli`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_cli(MigrationRegistry::new()).await
}
