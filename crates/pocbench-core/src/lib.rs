//! # pocbench core
//!
//! Transactional interaction recording under row-level locks: validate the
//! interaction type, lock the customer row, append an `interaction_log` row,
//! stamp `last_contact_date`, commit. All of it or none of it.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` / `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. [`Error`] has exactly
//! three categories: validation, not found, transaction.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod config;
pub mod coordinator;
pub mod domain;
mod error;
pub mod reader;
pub mod store;
pub mod writer;

pub use config::{load_config, Config, DatabaseConfig, StoreBackend};
pub use coordinator::InteractionCoordinator;
pub use domain::{
    Customer, CustomerId, InteractionId, InteractionPhase, InteractionRecord, InteractionType,
    NewInteraction,
};
pub use error::{Error, ErrorCode, NotFoundError, TransactionError, ValidationError};
pub use reader::CustomerLockingReader;
pub use store::{open_store, EntityStore, MemoryStore, PgStore, SharedEntityStore, StoreTransaction};
pub use writer::InteractionWriter;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
