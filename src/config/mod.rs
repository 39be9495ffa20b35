use crate::dialect::{dialect_for_driver, Dialect};
use crate::utils::{DBCONF_FILE, DBCONF_YAML_FILE};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Database error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("Environment '{0}' not found in {1}")]
    EnvironmentNotFound(String, String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),
}

/// One environment entry of `dbconf.yml` / `dbconf.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub driver: String,
    pub open: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrations_dir: Option<String>,
}

/// Connection descriptor handed to the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Driver {
    pub name: String,
    pub open: String,
}

/// Resolved configuration for one environment
#[derive(Debug, Clone)]
pub struct DbConf {
    pub env: String,
    pub migrations_dir: PathBuf,
    pub driver: Driver,
}

impl DbConf {
    /// Build a configuration from an already parsed environment map
    pub fn from_environments(
        config_path: &Path,
        env: &str,
        mut environments: HashMap<String, EnvironmentConfig>,
    ) -> Result<Self, ConfigError> {
        let entry = environments.remove(env).ok_or_else(|| {
            ConfigError::EnvironmentNotFound(env.to_string(), config_path.display().to_string())
        })?;
        let db_path = config_path.parent().unwrap_or_else(|| Path::new(""));

        let migrations_dir = match entry.migrations_dir {
            Some(dir) => PathBuf::from(dir),
            None => db_path.join("migrations"),
        };

        Ok(Self {
            env: env.to_string(),
            migrations_dir,
            driver: Driver {
                name: entry.driver,
                open: expand_env(&entry.open),
            },
        })
    }

    /// Dialect matching the configured driver
    pub fn dialect(&self) -> Result<Box<dyn Dialect>, ConfigError> {
        dialect_for_driver(&self.driver.name)
    }

    /// Open a connection using the configured driver
    pub fn open_connection(&self) -> Result<Connection, ConfigError> {
        // Reject unknown drivers before touching the filesystem
        self.dialect()?;
        let conn = match self.driver.open.as_str() {
            ":memory:" => Connection::open_in_memory()?,
            path => Connection::open(path)?,
        };
        Ok(conn)
    }
}

/// Read `<db_path>/dbconf.yml` (or `dbconf.json` when there is no YAML
/// file) and select `env`
pub async fn read_db_conf(db_path: &Path, env: &str) -> Result<DbConf, ConfigError> {
    let yaml_path = db_path.join(DBCONF_YAML_FILE);
    let (config_path, environments): (PathBuf, HashMap<String, EnvironmentConfig>) =
        if yaml_path.exists() {
            let content = fs::read_to_string(&yaml_path).await?;
            let environments = serde_yaml::from_str(&content)?;
            (yaml_path, environments)
        } else {
            let json_path = db_path.join(DBCONF_FILE);
            let content = fs::read_to_string(&json_path).await?;
            let environments = serde_json::from_str(&content)?;
            (json_path, environments)
        };

    DbConf::from_environments(&config_path, env, environments)
}

/// Replace `$VAR` and `${VAR}` with values from the process environment.
/// Unset variables expand to an empty string.
fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if braced && chars.peek() == Some(&'}') {
            chars.next();
        }

        if name.is_empty() {
            out.push('$');
            if braced {
                out.push('{');
            }
        } else {
            out.push_str(&std::env::var(&name).unwrap_or_default());
        }
    }

    out
}
