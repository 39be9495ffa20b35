use serde::Serialize;

/// Context for the migration source template
/// Placeholders: {{version}}, {{name}}
#[derive(Debug, Clone, Serialize)]
pub struct MigrationTemplateContext {
    pub version: String,
    pub name: String,
}

impl MigrationTemplateContext {
    /// File name of the generated source, `m<version>_<name>.rs`.
    /// Rust module names cannot start with a digit, hence the prefix.
    pub fn file_name(&self) -> String {
        format!("m{}_{}.rs", self.version, self.name)
    }
}
