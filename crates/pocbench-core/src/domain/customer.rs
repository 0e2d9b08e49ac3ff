//! The `Customer` row as seen by this core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CustomerId;

/// A customer row.
///
/// `name` and `email` are owned by external collaborators and only read here.
/// `last_contact_date` is mutated exclusively by the interaction coordinator
/// while it holds the row lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub last_contact_date: Option<DateTime<Utc>>,
}

impl Customer {
    /// A customer that has never been contacted.
    pub fn new(id: CustomerId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            last_contact_date: None,
        }
    }

    /// Fixture-style customer used for benchmark seeding: `Customer n`,
    /// `customer<n>@example.com`.
    pub fn seeded(id: CustomerId) -> Self {
        Self::new(
            id,
            format!("Customer {id}"),
            format!("customer{id}@example.com"),
        )
    }
}
