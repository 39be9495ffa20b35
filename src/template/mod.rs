mod engine;
mod types;

pub use engine::{
    create_migration, create_migration_with_context, validate_migration_name, TemplateEngine,
    TemplateError,
};
pub use types::MigrationTemplateContext;
