//! Shared fixtures for pocbench-core integration tests.
//!
//! Wrapping stores delegate to an inner store and either count storage
//! access, record committed stamps, or inject faults at a chosen step.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pocbench_core::{
    Customer, CustomerId, CustomerLockingReader, EntityStore, InteractionCoordinator,
    InteractionId, InteractionRecord, InteractionWriter, MemoryStore, NewInteraction,
    SharedEntityStore, StoreTransaction, TransactionError,
};

type TxResult<T> = Result<T, TransactionError>;

/// Memory store holding `Customer::seeded` rows for `ids`.
pub fn seeded_store(ids: &[i64], lock_timeout: Duration) -> MemoryStore {
    let store = MemoryStore::new(lock_timeout);
    for id in ids {
        store
            .insert_customer(Customer::seeded(CustomerId::new(*id)))
            .expect("insert customer");
    }
    store
}

pub fn coordinator_over(store: SharedEntityStore) -> InteractionCoordinator {
    InteractionCoordinator::new(store, CustomerLockingReader::new(), InteractionWriter::new())
}

// ═══════════════════════════════════════════════════════════════════════════
// COUNTING STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Counts every call that reaches storage.
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EntityStore for CountingStore {
    async fn begin(&self) -> TxResult<Box<dyn StoreTransaction>> {
        self.tick();
        self.inner.begin().await
    }

    async fn find_customer(&self, id: CustomerId) -> TxResult<Option<Customer>> {
        self.tick();
        self.inner.find_customer(id).await
    }

    async fn find_interaction(&self, id: InteractionId) -> TxResult<Option<InteractionRecord>> {
        self.tick();
        self.inner.find_interaction(id).await
    }

    async fn interactions_for_customer(&self, id: CustomerId) -> TxResult<Vec<InteractionRecord>> {
        self.tick();
        self.inner.interactions_for_customer(id).await
    }

    async fn ping(&self) -> TxResult<()> {
        self.tick();
        self.inner.ping().await
    }

    fn backend(&self) -> &'static str {
        "counting"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FAULTY STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Step at which a `FaultyStore` transaction fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `touch_last_contact` fails after the insert succeeded.
    AfterInsert,
    /// `commit` fails; the inner transaction is rolled back.
    AtCommit,
    /// `rollback` fails after an earlier step failed.
    AfterInsertAndRollback,
}

pub struct FaultyStore {
    inner: MemoryStore,
    fault: Fault,
    rollbacks: Arc<AtomicUsize>,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore, fault: Fault) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fault,
            rollbacks: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityStore for FaultyStore {
    async fn begin(&self) -> TxResult<Box<dyn StoreTransaction>> {
        let inner = self.inner.begin().await?;
        Ok(Box::new(FaultyTransaction {
            inner,
            fault: self.fault,
            rollbacks: Arc::clone(&self.rollbacks),
        }))
    }

    async fn find_customer(&self, id: CustomerId) -> TxResult<Option<Customer>> {
        self.inner.find_customer(id).await
    }

    async fn find_interaction(&self, id: InteractionId) -> TxResult<Option<InteractionRecord>> {
        self.inner.find_interaction(id).await
    }

    async fn interactions_for_customer(&self, id: CustomerId) -> TxResult<Vec<InteractionRecord>> {
        self.inner.interactions_for_customer(id).await
    }

    async fn ping(&self) -> TxResult<()> {
        self.inner.ping().await
    }

    fn backend(&self) -> &'static str {
        "faulty"
    }
}

struct FaultyTransaction {
    inner: Box<dyn StoreTransaction>,
    fault: Fault,
    rollbacks: Arc<AtomicUsize>,
}

#[async_trait]
impl StoreTransaction for FaultyTransaction {
    async fn select_customer_for_update(&mut self, id: CustomerId) -> TxResult<Option<Customer>> {
        self.inner.select_customer_for_update(id).await
    }

    async fn insert_interaction(&mut self, new: &NewInteraction) -> TxResult<InteractionRecord> {
        self.inner.insert_interaction(new).await
    }

    async fn touch_last_contact(&mut self, id: CustomerId) -> TxResult<DateTime<Utc>> {
        match self.fault {
            Fault::AfterInsert | Fault::AfterInsertAndRollback => Err(TransactionError::Storage(
                "injected fault after insert".to_string(),
            )),
            Fault::AtCommit => self.inner.touch_last_contact(id).await,
        }
    }

    async fn commit(self: Box<Self>) -> TxResult<()> {
        let this = *self;
        if this.fault == Fault::AtCommit {
            this.inner.rollback().await?;
            return Err(TransactionError::Commit("injected commit fault".to_string()));
        }
        this.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> TxResult<()> {
        let this = *self;
        this.rollbacks.fetch_add(1, Ordering::SeqCst);
        this.inner.rollback().await?;
        if this.fault == Fault::AfterInsertAndRollback {
            return Err(TransactionError::Connection("injected rollback fault".to_string()));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RECORDING STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Keeps the `last_contact_date` stamp of every transaction that committed.
pub struct RecordingStore {
    inner: SharedEntityStore,
    committed: Arc<Mutex<Vec<DateTime<Utc>>>>,
}

impl RecordingStore {
    pub fn new(inner: SharedEntityStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            committed: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Stamps of committed transactions, in no particular order.
    pub fn committed_stamps(&self) -> Vec<DateTime<Utc>> {
        self.committed.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntityStore for RecordingStore {
    async fn begin(&self) -> TxResult<Box<dyn StoreTransaction>> {
        let inner = self.inner.begin().await?;
        Ok(Box::new(RecordingTransaction {
            inner,
            stamp: None,
            committed: Arc::clone(&self.committed),
        }))
    }

    async fn find_customer(&self, id: CustomerId) -> TxResult<Option<Customer>> {
        self.inner.find_customer(id).await
    }

    async fn find_interaction(&self, id: InteractionId) -> TxResult<Option<InteractionRecord>> {
        self.inner.find_interaction(id).await
    }

    async fn interactions_for_customer(&self, id: CustomerId) -> TxResult<Vec<InteractionRecord>> {
        self.inner.interactions_for_customer(id).await
    }

    async fn ping(&self) -> TxResult<()> {
        self.inner.ping().await
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}

struct RecordingTransaction {
    inner: Box<dyn StoreTransaction>,
    stamp: Option<DateTime<Utc>>,
    committed: Arc<Mutex<Vec<DateTime<Utc>>>>,
}

#[async_trait]
impl StoreTransaction for RecordingTransaction {
    async fn select_customer_for_update(&mut self, id: CustomerId) -> TxResult<Option<Customer>> {
        self.inner.select_customer_for_update(id).await
    }

    async fn insert_interaction(&mut self, new: &NewInteraction) -> TxResult<InteractionRecord> {
        self.inner.insert_interaction(new).await
    }

    async fn touch_last_contact(&mut self, id: CustomerId) -> TxResult<DateTime<Utc>> {
        let stamp = self.inner.touch_last_contact(id).await?;
        self.stamp = Some(stamp);
        Ok(stamp)
    }

    async fn commit(self: Box<Self>) -> TxResult<()> {
        let this = *self;
        this.inner.commit().await?;
        if let Some(stamp) = this.stamp {
            this.committed.lock().unwrap().push(stamp);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> TxResult<()> {
        self.inner.rollback().await
    }
}
