//! Domain types for the interaction-recording core.
//!
//! Plain data-transfer structs populated by explicit queries. Nothing here
//! touches storage or async.

pub mod customer;
pub mod identifiers;
pub mod interaction;
pub mod phase;

pub use customer::Customer;
pub use identifiers::{CustomerId, InteractionId};
pub use interaction::{InteractionRecord, InteractionType, NewInteraction};
pub use phase::{InteractionPhase, PhaseTransitionError};
