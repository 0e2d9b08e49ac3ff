//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: `~/.config/pocbench/config.toml`
//! 3. Project config: `./pocbench.toml` (or an explicit `--config` path)
//! 4. Environment variables: `POCBENCH_*`
//! 5. CLI flags (applied by the binary)
//!
//! Validation runs once, after the last layer.
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [database]
//! backend = "postgres"
//! url = "postgres://poc_user:poc_password@db:5432/poc_db"
//! lock_timeout_ms = 2000
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files and environment
//! - `validate`: Validation

mod defaults;
mod load;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use load::{global_config_path, load_config, load_toml_file, merge_tables, PROJECT_CONFIG_FILE};
pub use types::{Config, DatabaseConfig, LoggingConfig, ServerConfig, StoreBackend};
