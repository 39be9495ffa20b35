//! Migration registry for managing and querying available migrations.

use super::types::{Migration, MigrationError, MigrationFn};
use rusqlite::Transaction;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of all available migrations.
///
/// Versions are kept in ascending order. The registry is filled once at
/// startup and then shared read-only with the planner and executor.
#[derive(Default)]
pub struct MigrationRegistry {
    migrations: BTreeMap<i64, Arc<Migration>>,
}

impl MigrationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            migrations: BTreeMap::new(),
        }
    }

    /// Register a migration.
    ///
    /// Fails if the version is not positive or already registered.
    pub fn register<U, D>(
        &mut self,
        version: i64,
        name: impl Into<String>,
        up: U,
        down: D,
    ) -> Result<(), MigrationError>
    where
        U: Fn(&Transaction<'_>) -> Result<(), MigrationError> + Send + Sync + 'static,
        D: Fn(&Transaction<'_>) -> Result<(), MigrationError> + Send + Sync + 'static,
    {
        self.register_migration(Migration {
            version,
            name: name.into(),
            up: Arc::new(up) as MigrationFn,
            down: Arc::new(down) as MigrationFn,
        })
    }

    /// Register an already built migration.
    pub fn register_migration(&mut self, migration: Migration) -> Result<(), MigrationError> {
        if migration.version <= 0 {
            return Err(MigrationError::InvalidVersion(migration.version));
        }
        if self.migrations.contains_key(&migration.version) {
            return Err(MigrationError::DuplicateVersion(migration.version));
        }

        self.migrations
            .insert(migration.version, Arc::new(migration));
        Ok(())
    }

    pub fn get(&self, version: i64) -> Option<&Arc<Migration>> {
        self.migrations.get(&version)
    }

    pub fn contains(&self, version: i64) -> bool {
        self.migrations.contains_key(&version)
    }

    /// Registered versions, ascending.
    pub fn versions(&self) -> Vec<i64> {
        self.migrations.keys().copied().collect()
    }

    /// Registered migrations, ascending by version.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Migration>> {
        self.migrations.values()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}
