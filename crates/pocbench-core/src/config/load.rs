//! Configuration loading from files and environment (Immutable functional pattern)
//!
//! This module handles loading configuration from:
//! 1. Built-in defaults
//! 2. Global config: `~/.config/pocbench/config.toml`
//! 3. Project config: `./pocbench.toml`, or an explicit path
//! 4. Environment variables: `POCBENCH_*`
//!
//! Files are merged as TOML tables before deserialization, so a file only
//! needs to name the keys it overrides.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use super::types::Config;
use crate::{Error, Result};

/// Project config file looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "pocbench.toml";

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy
///
/// With `explicit` set, that file replaces the project config lookup and must
/// exist. The result is not validated: callers apply their own overrides
/// (CLI flags) first, then call [`Config::validate`].
///
/// # Errors
///
/// Returns error if:
/// - A config file is malformed TOML or has mistyped values
/// - An explicit config path does not exist
/// - An environment override cannot be parsed
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    // 1. Defaults come from `#[serde(default)]`; start from an empty table
    let table = toml::Table::new();

    // 2. Global config, if present
    let table = match global_config_path() {
        Some(path) if path.is_file() => merge_tables(table, load_toml_file(&path)?),
        _ => table,
    };

    // 3. Project config (explicit path must exist)
    let table = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::invalid_config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            merge_tables(table, load_toml_file(path)?)
        }
        None => {
            let project = PathBuf::from(PROJECT_CONFIG_FILE);
            if project.is_file() {
                merge_tables(table, load_toml_file(&project)?)
            } else {
                table
            }
        }
    };

    // 4. Deserialize, then apply environment overrides
    let config: Config = toml::Value::Table(table).try_into()?;
    config.apply_env_vars()
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "pocbench")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Load a TOML file into a table
///
/// # Errors
///
/// Returns error if:
/// - Path is a directory instead of a file
/// - File cannot be read
/// - TOML is malformed
pub fn load_toml_file(path: &Path) -> Result<toml::Table> {
    if path.is_dir() {
        return Err(Error::invalid_config(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::invalid_config(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    content.parse::<toml::Table>().map_err(|e| {
        Error::parse_error(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

/// Deep-merge `overlay` into `base`; overlay wins on scalar conflicts.
pub fn merge_tables(base: toml::Table, overlay: toml::Table) -> toml::Table {
    overlay
        .into_iter()
        .fold(base, |mut merged, (key, value)| {
            let value = match (merged.remove(&key), value) {
                (Some(toml::Value::Table(old)), toml::Value::Table(new)) => {
                    toml::Value::Table(merge_tables(old, new))
                }
                (_, new) => new,
            };
            merged.insert(key, value);
            merged
        })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply environment variable overrides - immutable pattern
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(mut self) -> Result<Self> {
        if let Some(value) = env_string("POCBENCH_BIND") {
            self.server.bind = value;
        }
        if let Some(value) = env_parse("POCBENCH_DB_READ_CUSTOMER_ID")? {
            self.server.db_read_customer_id = value;
        }

        if let Some(value) = env_parse("POCBENCH_DATABASE_BACKEND")? {
            self.database.backend = value;
        }
        if let Some(value) = env_string("POCBENCH_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = env_parse("POCBENCH_DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = value;
        }
        if let Some(value) = env_parse("POCBENCH_DATABASE_MIN_CONNECTIONS")? {
            self.database.min_connections = value;
        }
        if let Some(value) = env_parse("POCBENCH_DATABASE_ACQUIRE_TIMEOUT_MS")? {
            self.database.acquire_timeout_ms = value;
        }
        if let Some(value) = env_parse("POCBENCH_DATABASE_LOCK_TIMEOUT_MS")? {
            self.database.lock_timeout_ms = value;
        }
        if let Some(value) = env_parse("POCBENCH_DATABASE_STATEMENT_TIMEOUT_MS")? {
            self.database.statement_timeout_ms = value;
        }
        if let Some(value) = env_parse("POCBENCH_DATABASE_BOOTSTRAP_SCHEMA")? {
            self.database.bootstrap_schema = value;
        }
        if let Some(value) = env_parse("POCBENCH_DATABASE_SEED_CUSTOMERS")? {
            self.database.seed_customers = value;
        }

        if let Some(value) = env_string("POCBENCH_LOG_FILTER") {
            self.logging.filter = value;
        }
        if let Some(value) = env_parse("POCBENCH_LOG_ANSI")? {
            self.logging.ansi = value;
        }

        Ok(self)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| Error::invalid_config(format!("Invalid {name} value '{raw}': {e}")))
        })
        .transpose()
}
