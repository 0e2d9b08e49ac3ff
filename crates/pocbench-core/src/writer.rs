//! Interaction Writer.

use crate::{
    domain::{InteractionRecord, NewInteraction},
    error::TransactionError,
    store::StoreTransaction,
};

/// Appends interaction rows inside the caller's transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionWriter;

impl InteractionWriter {
    pub const fn new() -> Self {
        Self
    }

    /// Insert `new` and return the row as stored, with its assigned id and
    /// `created_at`.
    pub async fn write(
        &self,
        tx: &mut dyn StoreTransaction,
        new: &NewInteraction,
    ) -> Result<InteractionRecord, TransactionError> {
        let record = tx.insert_interaction(new).await?;
        tracing::debug!(
            interaction_id = %record.id,
            customer_id = %record.customer_id,
            interaction_type = %record.interaction_type,
            "Interaction row inserted"
        );
        Ok(record)
    }
}
