//! Interaction log entities and the closed interaction type enumeration.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::{CustomerId, InteractionId};
use crate::error::ValidationError;

/// Kind of customer contact. Closed set, matched case-sensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionType {
    Call,
    Email,
    Meeting,
    Purchase,
    Support,
    Other,
}

impl InteractionType {
    /// Parse a wire value, rejecting anything outside the enumeration.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Self::from_str(value).map_err(|_| ValidationError::InvalidInteractionType {
            value: value.to_string(),
        })
    }

    /// Accepted wire values, comma separated, in declaration order.
    pub fn accepted_list() -> String {
        Self::iter()
            .map(|t| t.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Validated payload for a new `interaction_log` row.
///
/// Carries no id and no timestamp: both are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInteraction {
    pub customer_id: CustomerId,
    pub note: String,
    pub interaction_type: InteractionType,
}

/// A committed `interaction_log` row. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: InteractionId,
    pub customer_id: CustomerId,
    pub note: String,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub created_at: DateTime<Utc>,
}
