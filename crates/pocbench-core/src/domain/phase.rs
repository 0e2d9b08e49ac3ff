//! Per-request phase state machine for interaction creation (pure domain logic)
//!
//! # State Machine
//!
//! ```text
//! validating -> locking_customer -> writing_interaction -> updating_customer -> committed
//!      |               |                    |                     |
//!      v               v                    v                     v
//!   aborted         aborted              aborted               aborted
//! ```
//!
//! Terminal states: `committed`, `aborted`

use std::fmt;

use thiserror::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// STATE MACHINE ERROR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Error type for invalid phase transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid phase transition: cannot transition from {from} to {to}")]
pub struct PhaseTransitionError {
    pub from: InteractionPhase,
    pub to: InteractionPhase,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// INTERACTION PHASE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where a single `CreateInteraction` request is in its pipeline.
///
/// Valid transitions:
/// - validating -> `locking_customer`
/// - `locking_customer` -> `writing_interaction`
/// - `writing_interaction` -> `updating_customer`
/// - `updating_customer` -> committed
/// - any non-terminal phase -> aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionPhase {
    /// Checking `type` against the enumeration. No storage touched yet.
    #[default]
    Validating,
    /// Waiting for (or holding) the customer row lock.
    LockingCustomer,
    /// Inserting the interaction record.
    WritingInteraction,
    /// Stamping `last_contact_date` on the locked customer.
    UpdatingCustomer,
    /// Transaction committed; effects visible.
    Committed,
    /// Transaction rolled back or never opened; no effects visible.
    Aborted,
}

impl InteractionPhase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::LockingCustomer => "locking_customer",
            Self::WritingInteraction => "writing_interaction",
            Self::UpdatingCustomer => "updating_customer",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        }
    }

    /// Returns true if this phase has no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }

    /// Returns true if a transition from `self` to `target` is valid.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        self.validate_transition(target).is_ok()
    }

    /// Validates that a transition from `self` to `target` is allowed.
    pub fn validate_transition(&self, target: Self) -> Result<(), PhaseTransitionError> {
        let is_valid = !self.is_terminal()
            && (target == Self::Aborted
                || matches!(
                    (self, target),
                    (Self::Validating, Self::LockingCustomer)
                        | (Self::LockingCustomer, Self::WritingInteraction)
                        | (Self::WritingInteraction, Self::UpdatingCustomer)
                        | (Self::UpdatingCustomer, Self::Committed)
                ));

        if is_valid {
            Ok(())
        } else {
            Err(PhaseTransitionError {
                from: *self,
                to: target,
            })
        }
    }

    /// Move to `target`, returning the new phase.
    pub fn advance(self, target: Self) -> Result<Self, PhaseTransitionError> {
        self.validate_transition(target).map(|()| target)
    }

    /// Returns all phases in pipeline order, `aborted` last.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Validating,
            Self::LockingCustomer,
            Self::WritingInteraction,
            Self::UpdatingCustomer,
            Self::Committed,
            Self::Aborted,
        ]
    }
}

impl fmt::Display for InteractionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
