//! In-process Entity Store.
//!
//! Each customer row owns an async mutex that plays the role of the row lock.
//! A transaction acquires it on first touch and keeps the owned guard until
//! commit, rollback or drop. Writes are buffered in the transaction and only
//! applied to the shared tables at commit.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{EntityStore, StoreTransaction};
use crate::{
    config::DatabaseConfig,
    domain::{Customer, CustomerId, InteractionId, InteractionRecord, NewInteraction},
    error::TransactionError,
    Result,
};

type TxResult<T> = std::result::Result<T, TransactionError>;

// ═══════════════════════════════════════════════════════════════════════════
// TABLES
// ═══════════════════════════════════════════════════════════════════════════

struct CustomerRow {
    lock: Arc<Mutex<()>>,
    committed: RwLock<Customer>,
}

impl CustomerRow {
    fn new(customer: Customer) -> Self {
        Self {
            lock: Arc::new(Mutex::new(())),
            committed: RwLock::new(customer),
        }
    }

    fn snapshot(&self) -> TxResult<Customer> {
        self.committed
            .read()
            .map(|c| c.clone())
            .map_err(|_| poisoned("customer row"))
    }
}

struct Tables {
    customers: RwLock<HashMap<CustomerId, Arc<CustomerRow>>>,
    interactions: RwLock<BTreeMap<InteractionId, InteractionRecord>>,
    next_interaction_id: AtomicI64,
}

impl Tables {
    fn customer_row(&self, id: CustomerId) -> TxResult<Option<Arc<CustomerRow>>> {
        self.customers
            .read()
            .map(|rows| rows.get(&id).cloned())
            .map_err(|_| poisoned("customer table"))
    }

    fn allocate_interaction_id(&self) -> InteractionId {
        InteractionId::new(self.next_interaction_id.fetch_add(1, Ordering::SeqCst))
    }
}

fn poisoned(what: &str) -> TransactionError {
    TransactionError::Storage(format!("{what} lock poisoned"))
}

// ═══════════════════════════════════════════════════════════════════════════
// STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Entity Store kept entirely in memory.
///
/// Cloning shares the same tables.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Tables>,
    lock_timeout: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DatabaseConfig::default().lock_timeout())
    }
}

impl MemoryStore {
    /// Empty store whose row-lock waits give up after `lock_timeout`.
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            tables: Arc::new(Tables {
                customers: RwLock::new(HashMap::new()),
                interactions: RwLock::new(BTreeMap::new()),
                next_interaction_id: AtomicI64::new(1),
            }),
            lock_timeout,
        }
    }

    /// Insert or replace a customer row.
    ///
    /// Replacing a row that a live transaction has locked is not supported;
    /// this is a fixture entry point.
    pub fn insert_customer(&self, customer: Customer) -> Result<()> {
        let mut rows = self
            .tables
            .customers
            .write()
            .map_err(|_| poisoned("customer table"))?;
        rows.insert(customer.id, Arc::new(CustomerRow::new(customer)));
        Ok(())
    }

    /// Ensure customers `1..=count` exist, leaving existing rows untouched.
    pub fn seed(&self, count: u32) -> Result<()> {
        let mut rows = self
            .tables
            .customers
            .write()
            .map_err(|_| poisoned("customer table"))?;
        (1..=i64::from(count)).map(CustomerId::new).for_each(|id| {
            rows.entry(id)
                .or_insert_with(|| Arc::new(CustomerRow::new(Customer::seeded(id))));
        });
        Ok(())
    }

    /// Number of committed interaction rows.
    pub fn interaction_count(&self) -> Result<usize> {
        let count = self
            .tables
            .interactions
            .read()
            .map(|rows| rows.len())
            .map_err(|_| poisoned("interaction table"))?;
        Ok(count)
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn begin(&self) -> TxResult<Box<dyn StoreTransaction>> {
        Ok(Box::new(MemoryTransaction {
            tables: Arc::clone(&self.tables),
            lock_timeout: self.lock_timeout,
            held: HashMap::new(),
            pending_interactions: Vec::new(),
            pending_contacts: HashMap::new(),
        }))
    }

    async fn find_customer(&self, id: CustomerId) -> TxResult<Option<Customer>> {
        self.tables
            .customer_row(id)?
            .map(|row| row.snapshot())
            .transpose()
    }

    async fn find_interaction(&self, id: InteractionId) -> TxResult<Option<InteractionRecord>> {
        self.tables
            .interactions
            .read()
            .map(|rows| rows.get(&id).cloned())
            .map_err(|_| poisoned("interaction table"))
    }

    async fn interactions_for_customer(&self, id: CustomerId) -> TxResult<Vec<InteractionRecord>> {
        self.tables
            .interactions
            .read()
            .map(|rows| {
                rows.values()
                    .filter(|r| r.customer_id == id)
                    .cloned()
                    .collect()
            })
            .map_err(|_| poisoned("interaction table"))
    }

    async fn ping(&self) -> TxResult<()> {
        self.tables
            .customers
            .read()
            .map(|_| ())
            .map_err(|_| poisoned("customer table"))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSACTION
// ═══════════════════════════════════════════════════════════════════════════

struct HeldRow {
    row: Arc<CustomerRow>,
    _guard: OwnedMutexGuard<()>,
}

struct MemoryTransaction {
    tables: Arc<Tables>,
    lock_timeout: Duration,
    held: HashMap<CustomerId, HeldRow>,
    pending_interactions: Vec<InteractionRecord>,
    pending_contacts: HashMap<CustomerId, DateTime<Utc>>,
}

impl MemoryTransaction {
    /// Acquire the row lock unless this transaction already holds it.
    ///
    /// Returns `false` when the row does not exist.
    async fn lock_row(&mut self, id: CustomerId) -> TxResult<bool> {
        if self.held.contains_key(&id) {
            return Ok(true);
        }
        let Some(row) = self.tables.customer_row(id)? else {
            return Ok(false);
        };

        let guard = tokio::time::timeout(self.lock_timeout, Arc::clone(&row.lock).lock_owned())
            .await
            .map_err(|_| TransactionError::LockTimeout)?;

        self.held.insert(id, HeldRow { row, _guard: guard });
        Ok(true)
    }

    /// The customer as this transaction sees it: committed state plus its own
    /// pending `last_contact_date`.
    fn view(&self, id: CustomerId) -> TxResult<Option<Customer>> {
        self.held
            .get(&id)
            .map(|held| {
                held.row.snapshot().map(|mut customer| {
                    if let Some(stamp) = self.pending_contacts.get(&id) {
                        customer.last_contact_date = Some(*stamp);
                    }
                    customer
                })
            })
            .transpose()
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn select_customer_for_update(&mut self, id: CustomerId) -> TxResult<Option<Customer>> {
        if self.lock_row(id).await? {
            self.view(id)
        } else {
            Ok(None)
        }
    }

    async fn insert_interaction(&mut self, new: &NewInteraction) -> TxResult<InteractionRecord> {
        if self.tables.customer_row(new.customer_id)?.is_none() {
            return Err(TransactionError::Constraint(format!(
                "interaction_log.customer_id {} has no customer row",
                new.customer_id
            )));
        }

        let record = InteractionRecord {
            id: self.tables.allocate_interaction_id(),
            customer_id: new.customer_id,
            note: new.note.clone(),
            interaction_type: new.interaction_type,
            created_at: Utc::now(),
        };
        self.pending_interactions.push(record.clone());
        Ok(record)
    }

    async fn touch_last_contact(&mut self, id: CustomerId) -> TxResult<DateTime<Utc>> {
        if !self.lock_row(id).await? {
            return Err(TransactionError::Storage(format!(
                "update matched no customer row for id {id}"
            )));
        }
        let previous = self.view(id)?.and_then(|c| c.last_contact_date);
        // Never moves backwards if the wall clock does.
        let stamp = previous.map_or_else(Utc::now, |p| p.max(Utc::now()));
        self.pending_contacts.insert(id, stamp);
        Ok(stamp)
    }

    async fn commit(self: Box<Self>) -> TxResult<()> {
        let this = *self;
        {
            let mut interactions = this
                .tables
                .interactions
                .write()
                .map_err(|_| poisoned("interaction table").at_commit())?;

            for (id, stamp) in &this.pending_contacts {
                let held = this.held.get(id).ok_or_else(|| {
                    TransactionError::Commit(format!("row lock for customer {id} not held"))
                })?;
                let mut customer = held
                    .row
                    .committed
                    .write()
                    .map_err(|_| poisoned("customer row").at_commit())?;
                customer.last_contact_date = Some(*stamp);
            }

            interactions.extend(this.pending_interactions.into_iter().map(|r| (r.id, r)));
        }
        drop(this.held);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> TxResult<()> {
        Ok(())
    }
}
