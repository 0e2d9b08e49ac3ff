//! Customer Locking Reader.

use tokio::time::Instant;

use crate::{
    domain::{Customer, CustomerId},
    error::TransactionError,
    store::StoreTransaction,
};

/// Reads a customer row and holds its exclusive lock until the transaction
/// ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerLockingReader;

impl CustomerLockingReader {
    pub const fn new() -> Self {
        Self
    }

    /// Lock and read `id` inside `tx`.
    ///
    /// Absence is `Ok(None)`, not an error. Blocks while another transaction
    /// holds the row.
    pub async fn lock(
        &self,
        tx: &mut dyn StoreTransaction,
        id: CustomerId,
    ) -> Result<Option<Customer>, TransactionError> {
        let started = Instant::now();
        let customer = tx.select_customer_for_update(id).await?;
        tracing::debug!(
            customer_id = %id,
            found = customer.is_some(),
            waited = ?started.elapsed(),
            "Customer row lock acquired"
        );
        Ok(customer)
    }
}
