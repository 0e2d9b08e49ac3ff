//! Validation error types for request input and configuration.
//!
//! These errors represent caller input or configuration problems that the
//! caller can correct. They are raised before any storage access.

use thiserror::Error;

use crate::domain::InteractionType;

/// Validation errors represent incorrect caller input or configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `type` is not a member of the interaction type enumeration
    #[error("Invalid interaction type. Must be one of: {}", InteractionType::accepted_list())]
    InvalidInteractionType { value: String },
    /// A required request field is absent or blank
    #[error("Invalid request: missing required field `{0}`")]
    MissingField(&'static str),
    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Parse error when reading configuration
    #[error("Parse error: {0}")]
    ParseError(String),
}
