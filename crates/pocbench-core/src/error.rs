//! Error types for pocbench with categorization:
//!
//! - **Validation errors**: caller input that violates a contract (client error)
//! - **Not found errors**: a referenced row does not exist at lock time
//! - **Transaction errors**: storage, lock-wait and commit faults (server error)
//!
//! The categories are distinct values so the request boundary can map each one
//! to its own response without string matching.

pub mod not_found;
pub mod transaction;
pub mod validation;

pub use not_found::NotFoundError;
pub use transaction::TransactionError;
pub use validation::ValidationError;

use serde::Serialize;

/// Top-level error type returned by every fallible operation in the crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Caller-supplied data violated a contract; fix the input and resend.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A referenced entity did not exist when it was looked up.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    /// Infrastructure fault; the transaction was rolled back.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Machine-readable error codes surfaced to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::AsRefStr, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInteractionType,
    CustomerNotFound,
    InvalidRequest,
}

// Convenience constructors
impl Error {
    /// Create a validation error for an unknown interaction type.
    pub fn invalid_interaction_type(value: impl Into<String>) -> Self {
        Self::Validation(ValidationError::InvalidInteractionType {
            value: value.into(),
        })
    }

    /// Create a validation error for a missing request field.
    pub const fn missing_field(field: &'static str) -> Self {
        Self::Validation(ValidationError::MissingField(field))
    }

    /// Create a validation error from an invalid config.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::InvalidConfig(msg.into()))
    }

    /// Create a validation error from a parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::ParseError(msg.into()))
    }

    /// Create a not-found error for a customer id.
    pub const fn customer_not_found(id: crate::domain::CustomerId) -> Self {
        Self::NotFound(NotFoundError::Customer(id))
    }

    /// Create a transaction error from an opaque storage failure.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Transaction(TransactionError::Storage(msg.into()))
    }
}

impl Error {
    /// Machine-readable code for client-facing errors.
    ///
    /// Transaction faults carry no business code.
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Validation(ValidationError::InvalidInteractionType { .. }) => {
                Some(ErrorCode::InvalidInteractionType)
            }
            Self::Validation(ValidationError::MissingField(_)) => Some(ErrorCode::InvalidRequest),
            Self::Validation(_) | Self::Transaction(_) => None,
            Self::NotFound(NotFoundError::Customer(_)) => Some(ErrorCode::CustomerNotFound),
        }
    }

    /// Message safe to show to a client.
    ///
    /// Validation and not-found errors carry enough detail to correct the
    /// request; transaction faults are reported generically.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::NotFound(err) => err.to_string(),
            Self::Transaction(_) => "Transaction failed".to_string(),
        }
    }

    /// Whether resending the whole operation may succeed.
    ///
    /// Only transaction faults qualify, and no partial state is left behind
    /// by them. Nothing in this crate retries on its own.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Transaction(TransactionError::from(err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::parse_error(format!("Failed to parse config: {err}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}
