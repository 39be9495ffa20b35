mod common;

use clap::Parser;
use common::{create_test_dir, register_failing, register_table, table_exists};
use goose_migrate::cli::run;
use goose_migrate::{Cli, MigrationRegistry};
use rusqlite::Connection;
use std::path::Path;
use tokio::fs;

fn registry() -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();
    register_table(&mut registry, 20140406181655, "users");
    register_table(&mut registry, 20140407090000, "posts");
    registry
}

async fn write_yaml_conf(dir: &Path) {
    let db_file = dir.join("cli.sqlite3");
    fs::write(
        dir.join("dbconf.yml"),
        format!("test:\n    driver: sqlite3\n    open: '{}'\n", db_file.display()),
    )
    .await
    .expect("Should write dbconf.yml");
}

async fn run_args(args: &[&str], registry: MigrationRegistry) -> (usize, String) {
    let cli = Cli::try_parse_from(args.iter().copied()).expect("Arguments should parse");
    let mut out = Vec::new();
    let failed = run(cli, registry, &mut out).await.expect("CLI run should succeed");
    (failed, String::from_utf8(out).expect("Output should be UTF-8"))
}

#[tokio::test]
async fn test_cli_applies_registered_migrations() {
    let temp_dir = create_test_dir();
    write_yaml_conf(temp_dir.path()).await;
    let path = temp_dir.path().to_string_lossy().to_string();

    let (failed, output) = run_args(&["goose", "--path", &path, "--env", "test", "up"], registry()).await;
    assert_eq!(failed, 0);
    assert!(output.contains("current version: 0, direction: UP"));
    assert!(output.contains("OK     20140406181655_create_users"));
    assert!(output.contains("OK     20140407090000_create_posts"));

    let conn = Connection::open(temp_dir.path().join("cli.sqlite3")).unwrap();
    assert!(table_exists(&conn, "users"));
    assert!(table_exists(&conn, "posts"));

    let (_, output) = run_args(&["goose", "-p", &path, "-e", "test", "down"], registry()).await;
    assert!(output.contains("OK     20140407090000_create_posts"));
    assert!(!table_exists(&conn, "posts"));

    let (_, output) = run_args(&["goose", "-p", &path, "-e", "test", "status"], registry()).await;
    let posts = output
        .lines()
        .find(|l| l.ends_with("20140407090000_create_posts"))
        .expect("posts listed");
    assert!(posts.contains("Pending"));
}

#[tokio::test]
async fn test_cli_force_then_up_skips_forced() {
    let temp_dir = create_test_dir();
    write_yaml_conf(temp_dir.path()).await;
    let path = temp_dir.path().to_string_lossy().to_string();

    let (_, output) = run_args(
        &["goose", "-p", &path, "-e", "test", "force", "20140406181655"],
        registry(),
    )
    .await;
    assert_eq!(output, "goose: forced version 20140406181655, current version: 20140406181655\n");

    let (_, output) = run_args(&["goose", "-p", &path, "-e", "test", "up"], registry()).await;
    assert!(!output.contains("create_users"));
    assert!(output.contains("OK     20140407090000_create_posts"));

    let conn = Connection::open(temp_dir.path().join("cli.sqlite3")).unwrap();
    assert!(!table_exists(&conn, "users"));
}

#[tokio::test]
async fn test_cli_reports_failed_count() {
    let temp_dir = create_test_dir();
    write_yaml_conf(temp_dir.path()).await;
    let path = temp_dir.path().to_string_lossy().to_string();

    let mut registry = registry();
    register_failing(&mut registry, 20140408000000);

    let (failed, output) = run_args(&["goose", "-p", &path, "-e", "test", "up"], registry).await;
    assert_eq!(failed, 1);
    assert!(output.contains("FAIL   20140408000000_always_fails"));
}

#[tokio::test]
async fn test_cli_missing_config_is_an_error() {
    let temp_dir = create_test_dir();
    let path = temp_dir.path().to_string_lossy().to_string();
    let cli = Cli::try_parse_from(["goose", "-p", path.as_str(), "-e", "test", "status"]).unwrap();

    let mut out = Vec::new();
    let err = run(cli, registry(), &mut out).await.unwrap_err();
    assert!(err.to_string().contains("couldn't load db config"));
}
