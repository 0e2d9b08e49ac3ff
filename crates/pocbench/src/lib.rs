//! # pocbench
//!
//! HTTP surface of the benchmark service: plaintext and JSON echo, a CPU-bound
//! hash, a single-row read, and the transactional interaction write backed by
//! [`pocbench_core::InteractionCoordinator`].

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod correlation;
pub mod cpu;
pub mod error;
pub mod handlers;
pub mod telemetry;

pub use app::{router, serve, AppState};
pub use error::ApiError;
