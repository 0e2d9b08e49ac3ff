//! Entity Store: transactional access to `customer` and `interaction_log`.
//!
//! Two engines implement the same traits:
//! - [`PgStore`]: Postgres through a `sqlx` pool, `SELECT ... FOR UPDATE`
//!   row locks with a server-side `lock_timeout`
//! - [`MemoryStore`]: in-process tables with one async mutex per customer row
//!
//! A [`StoreTransaction`] that is dropped without `commit` leaves no trace.

mod memory;
mod postgres;
mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use schema::SCHEMA;

use crate::{
    config::{DatabaseConfig, StoreBackend},
    domain::{Customer, CustomerId, InteractionId, InteractionRecord, NewInteraction},
    error::TransactionError,
    Result,
};

/// Shared handle to whichever engine the service was configured with.
pub type SharedEntityStore = Arc<dyn EntityStore>;

/// A storage engine that can open transactions and answer plain reads.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Open a transaction at the engine's default isolation level.
    async fn begin(&self) -> std::result::Result<Box<dyn StoreTransaction>, TransactionError>;

    /// Read a customer outside any transaction (committed state only).
    async fn find_customer(
        &self,
        id: CustomerId,
    ) -> std::result::Result<Option<Customer>, TransactionError>;

    async fn find_interaction(
        &self,
        id: InteractionId,
    ) -> std::result::Result<Option<InteractionRecord>, TransactionError>;

    /// All committed interactions for a customer, oldest first.
    async fn interactions_for_customer(
        &self,
        id: CustomerId,
    ) -> std::result::Result<Vec<InteractionRecord>, TransactionError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> std::result::Result<(), TransactionError>;

    /// Engine name for logs.
    fn backend(&self) -> &'static str;
}

/// One open transaction. Holds at most the row locks it acquired.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Lock the customer row for the rest of the transaction and read it.
    ///
    /// Blocks while another transaction holds the same row; returns
    /// `LockTimeout` when the wait exceeds the configured bound. `None` means
    /// no such row and nothing was locked.
    async fn select_customer_for_update(
        &mut self,
        id: CustomerId,
    ) -> std::result::Result<Option<Customer>, TransactionError>;

    /// Insert an interaction row; the store assigns `id` and `created_at`.
    async fn insert_interaction(
        &mut self,
        new: &NewInteraction,
    ) -> std::result::Result<InteractionRecord, TransactionError>;

    /// Set `last_contact_date` to the current time and return it.
    async fn touch_last_contact(
        &mut self,
        id: CustomerId,
    ) -> std::result::Result<DateTime<Utc>, TransactionError>;

    async fn commit(self: Box<Self>) -> std::result::Result<(), TransactionError>;

    async fn rollback(self: Box<Self>) -> std::result::Result<(), TransactionError>;
}

/// Build the configured engine.
///
/// For Postgres this connects the pool, then runs the schema and seeding
/// steps when enabled.
pub async fn open_store(config: &DatabaseConfig) -> Result<SharedEntityStore> {
    match config.backend {
        StoreBackend::Memory => {
            let store = MemoryStore::new(config.lock_timeout());
            store.seed(config.seed_customers)?;
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let store = PgStore::connect(config).await?;
            if config.bootstrap_schema {
                store.bootstrap_schema().await?;
            }
            if config.seed_customers > 0 {
                store.seed(config.seed_customers).await?;
            }
            Ok(Arc::new(store))
        }
    }
}
