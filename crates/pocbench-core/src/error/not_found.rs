//! Not-found error types.
//!
//! Absence is a business-rule failure, not a system fault: it is recoverable
//! only by the caller and is never retried.

use thiserror::Error;

use crate::domain::CustomerId;

/// A referenced entity did not exist when it was read under lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotFoundError {
    /// No customer row matched the id
    #[error("Customer with ID {0} not found")]
    Customer(CustomerId),
}
