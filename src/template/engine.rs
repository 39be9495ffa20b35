use handlebars::Handlebars;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;

use super::types::MigrationTemplateContext;
use crate::utils::new_version_stamp;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Render error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    #[error("Invalid migration name '{0}': use letters, digits and underscores")]
    InvalidName(String),

    #[error("Migration file already exists: {0}")]
    AlreadyExists(String),
}

const MIGRATION_TEMPLATE_NAME: &str = "rust-migration";

const MIGRATION_TEMPLATE: &str = r#"use goose_migrate::{MigrationError, MigrationRegistry};
use rusqlite::Transaction;

/// Register this migration with the registry.
pub fn register(registry: &mut MigrationRegistry) -> Result<(), MigrationError> {
    registry.register({{version}}, "{{name}}", up, down)
}

/// Executed when this migration is applied.
fn up(tx: &Transaction<'_>) -> Result<(), MigrationError> {
    tx.execute_batch("")?;
    Ok(())
}

/// Executed when this migration is rolled back.
fn down(tx: &Transaction<'_>) -> Result<(), MigrationError> {
    tx.execute_batch("")?;
    Ok(())
}
"#;

static TEMPLATES: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut handlebars = Handlebars::new();
    // Generated Rust source, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string(MIGRATION_TEMPLATE_NAME, MIGRATION_TEMPLATE)
        .expect("built-in migration template should parse");
    handlebars
});

pub struct TemplateEngine {
    handlebars: &'static Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            handlebars: &TEMPLATES,
        }
    }

    /// Render the migration source for a context
    pub fn render_migration(&self, context: &MigrationTemplateContext) -> Result<String, TemplateError> {
        self.handlebars
            .render(MIGRATION_TEMPLATE_NAME, context)
            .map_err(TemplateError::from)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a migration name is usable in a file and module name
pub fn validate_migration_name(name: &str) -> Result<(), TemplateError> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(TemplateError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Write a new migration source file into `dir` and return its absolute path.
/// The version is the current UTC time.
pub async fn create_migration(name: &str, dir: &Path) -> Result<PathBuf, TemplateError> {
    let context = MigrationTemplateContext {
        version: new_version_stamp(),
        name: name.to_string(),
    };
    create_migration_with_context(&context, dir).await
}

/// Write the migration source for an explicit context
pub async fn create_migration_with_context(
    context: &MigrationTemplateContext,
    dir: &Path,
) -> Result<PathBuf, TemplateError> {
    validate_migration_name(&context.name)?;

    let engine = TemplateEngine::new();
    let content = engine.render_migration(context)?;

    fs::create_dir_all(dir).await?;
    let path = dir.join(context.file_name());
    if path.exists() {
        return Err(TemplateError::AlreadyExists(path.display().to_string()));
    }
    fs::write(&path, content).await?;

    let absolute = fs::canonicalize(&path).await?;
    info!(path = %absolute.display(), "Created migration");
    Ok(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MigrationTemplateContext {
        MigrationTemplateContext {
            version: "20140406181655".to_string(),
            name: "add_test_field".to_string(),
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(context().file_name(), "m20140406181655_add_test_field.rs");
    }

    #[test]
    fn test_render_migration() {
        let engine = TemplateEngine::new();
        let source = engine.render_migration(&context()).unwrap();

        assert!(source.contains(r#"registry.register(20140406181655, "add_test_field", up, down)"#));
        assert!(source.contains("fn up(tx: &Transaction<'_>)"));
        assert!(source.contains("fn down(tx: &Transaction<'_>)"));
    }

    #[test]
    fn test_validate_migration_name() {
        assert!(validate_migration_name("add_users_2").is_ok());
        assert!(validate_migration_name("").is_err());
        assert!(validate_migration_name("add-users").is_err());
        assert!(validate_migration_name("../escape").is_err());
    }
}
