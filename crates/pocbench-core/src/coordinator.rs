//! Interaction Transaction Coordinator.
//!
//! ```text
//! validate type ─► begin ─► lock customer ─► insert interaction ─► touch last_contact ─► commit
//!       │                        │                   │                     │                │
//!       └── ValidationError      └── NotFoundError   └──────── rollback ───┴── TransactionError
//! ```
//!
//! Every exit after `begin` either commits or rolls back before returning.

use crate::{
    domain::{
        CustomerId, InteractionPhase, InteractionRecord, InteractionType, NewInteraction,
    },
    error::TransactionError,
    reader::CustomerLockingReader,
    store::{SharedEntityStore, StoreTransaction},
    writer::InteractionWriter,
    Error, Result,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PHASE TRACKING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Current phase of one request, mirrored into the request span.
struct PhaseTracker {
    phase: InteractionPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        let tracker = Self {
            phase: InteractionPhase::default(),
        };
        tracker.record();
        tracker
    }

    fn enter(&mut self, next: InteractionPhase) -> Result<()> {
        self.phase = self
            .phase
            .advance(next)
            .map_err(|e| Error::Transaction(TransactionError::Storage(e.to_string())))?;
        tracing::debug!(phase = %self.phase, "Interaction phase");
        self.record();
        Ok(())
    }

    fn abort(&mut self) -> InteractionPhase {
        let failed_in = self.phase;
        if !self.phase.is_terminal() {
            self.phase = InteractionPhase::Aborted;
            self.record();
        }
        failed_in
    }

    fn record(&self) {
        tracing::Span::current().record("phase", self.phase.as_str());
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// COORDINATOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Sole entry point that turns an interaction request into a committed
/// state change.
///
/// Built once at startup and shared; holds no per-request state.
#[derive(Clone)]
pub struct InteractionCoordinator {
    store: SharedEntityStore,
    reader: CustomerLockingReader,
    writer: InteractionWriter,
}

impl InteractionCoordinator {
    pub fn new(
        store: SharedEntityStore,
        reader: CustomerLockingReader,
        writer: InteractionWriter,
    ) -> Self {
        Self {
            store,
            reader,
            writer,
        }
    }

    pub fn store(&self) -> &SharedEntityStore {
        &self.store
    }

    /// `CreateInteraction`: record one interaction and stamp the customer's
    /// `last_contact_date`, atomically.
    ///
    /// # Errors
    ///
    /// - `Validation` when `kind` is not an [`InteractionType`]; storage is
    ///   never touched
    /// - `NotFound` when no customer row matches under lock
    /// - `Transaction` for lock timeouts, deadlocks, storage and commit faults
    #[tracing::instrument(
        name = "create_interaction",
        skip(self, note),
        fields(phase = tracing::field::Empty)
    )]
    pub async fn create_interaction(
        &self,
        customer_id: i64,
        note: &str,
        kind: &str,
    ) -> Result<InteractionRecord> {
        let mut phases = PhaseTracker::new();

        let interaction_type = match InteractionType::parse(kind) {
            Ok(t) => t,
            Err(e) => {
                phases.abort();
                return Err(e.into());
            }
        };
        let new = NewInteraction {
            customer_id: CustomerId::new(customer_id),
            note: note.to_string(),
            interaction_type,
        };

        let mut tx = match self.store.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                phases.abort();
                return Err(e.into());
            }
        };

        match self.run(tx.as_mut(), &mut phases, &new).await {
            Ok(record) => match tx.commit().await {
                Ok(()) => {
                    phases.enter(InteractionPhase::Committed)?;
                    tracing::info!(
                        interaction_id = %record.id,
                        customer_id = %record.customer_id,
                        "Interaction committed"
                    );
                    Ok(record)
                }
                Err(e) => {
                    let failed_in = phases.abort();
                    tracing::warn!(error = %e, phase = %failed_in, "Commit failed");
                    Err(e.into())
                }
            },
            Err(err) => Err(Self::roll_back(tx, &mut phases, err).await),
        }
    }

    /// Lock, insert, update. Leaves the transaction open for the caller.
    async fn run(
        &self,
        tx: &mut dyn StoreTransaction,
        phases: &mut PhaseTracker,
        new: &NewInteraction,
    ) -> Result<InteractionRecord> {
        phases.enter(InteractionPhase::LockingCustomer)?;
        self.reader
            .lock(tx, new.customer_id)
            .await?
            .ok_or_else(|| Error::customer_not_found(new.customer_id))?;

        phases.enter(InteractionPhase::WritingInteraction)?;
        let record = self.writer.write(tx, new).await?;

        phases.enter(InteractionPhase::UpdatingCustomer)?;
        let stamp = tx.touch_last_contact(new.customer_id).await?;
        tracing::debug!(customer_id = %new.customer_id, last_contact_date = %stamp, "Customer touched");

        Ok(record)
    }

    /// Roll back and hand back the error that caused it.
    async fn roll_back(
        tx: Box<dyn StoreTransaction>,
        phases: &mut PhaseTracker,
        err: Error,
    ) -> Error {
        let failed_in = phases.abort();
        if let Err(rollback_err) = tx.rollback().await {
            tracing::warn!(error = %rollback_err, "Rollback failed");
        }
        match &err {
            Error::NotFound(_) => {
                tracing::debug!(error = %err, phase = %failed_in, "Rolled back");
            }
            _ => tracing::warn!(error = %err, phase = %failed_in, "Rolled back"),
        }
        err
    }
}
