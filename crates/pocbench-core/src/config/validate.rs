//! Configuration validation

use std::net::SocketAddr;

use super::types::{Config, StoreBackend};
use crate::{Error, Result};

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or invalid
    pub fn validate(&self) -> Result<()> {
        self.server.bind.parse::<SocketAddr>().map_err(|e| {
            Error::invalid_config(format!(
                "server.bind '{}' is not a socket address: {e}",
                self.server.bind
            ))
        })?;

        let db = &self.database;
        if db.backend == StoreBackend::Postgres && db.url.trim().is_empty() {
            return Err(Error::invalid_config(
                "database.url cannot be empty for the postgres backend",
            ));
        }
        if db.max_connections == 0 {
            return Err(Error::invalid_config(
                "database.max_connections must be at least 1",
            ));
        }
        if db.min_connections > db.max_connections {
            return Err(Error::invalid_config(format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                db.min_connections, db.max_connections
            )));
        }
        if db.lock_timeout_ms == 0 {
            return Err(Error::invalid_config(
                "database.lock_timeout_ms must be greater than 0",
            ));
        }
        if db.acquire_timeout_ms == 0 {
            return Err(Error::invalid_config(
                "database.acquire_timeout_ms must be greater than 0",
            ));
        }

        Ok(())
    }
}
