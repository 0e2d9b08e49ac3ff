//! Postgres Entity Store.
//!
//! Row locks are real `SELECT ... FOR UPDATE` locks. The lock-wait bound is
//! the session-level `lock_timeout`, so an expired wait surfaces as SQLSTATE
//! `55P03` and maps to [`TransactionError::LockTimeout`].
//!
//! Timestamps use `clock_timestamp()` rather than `now()`: `now()` is fixed at
//! transaction start, which would let a transaction that waited on the lock
//! stamp an older time than the one it queued behind.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool, Postgres, Transaction,
};

use super::{
    schema::{SCHEMA, SEED_CUSTOMERS},
    EntityStore, StoreTransaction,
};
use crate::{
    config::DatabaseConfig,
    domain::{Customer, CustomerId, InteractionId, InteractionRecord, InteractionType, NewInteraction},
    error::TransactionError,
    Error, Result,
};

type TxResult<T> = std::result::Result<T, TransactionError>;

type CustomerRow = (i64, String, String, Option<DateTime<Utc>>);
type InteractionRow = (i64, i64, String, String, DateTime<Utc>);

const SELECT_CUSTOMER: &str =
    "SELECT id, name, email, last_contact_date FROM customer WHERE id = $1";
const SELECT_CUSTOMER_FOR_UPDATE: &str =
    "SELECT id, name, email, last_contact_date FROM customer WHERE id = $1 FOR UPDATE";
const INSERT_INTERACTION: &str = "INSERT INTO interaction_log (customer_id, note, type, created_at)
     VALUES ($1, $2, $3, clock_timestamp())
     RETURNING id, customer_id, COALESCE(note, ''), type, created_at";
const TOUCH_LAST_CONTACT: &str = "UPDATE customer SET last_contact_date = clock_timestamp()
     WHERE id = $1
     RETURNING last_contact_date";
const SELECT_INTERACTION: &str = "SELECT id, customer_id, COALESCE(note, ''), type, created_at
     FROM interaction_log WHERE id = $1";
const SELECT_INTERACTIONS_FOR_CUSTOMER: &str =
    "SELECT id, customer_id, COALESCE(note, ''), type, created_at
     FROM interaction_log WHERE customer_id = $1 ORDER BY id";

fn customer_from_row((id, name, email, last_contact_date): CustomerRow) -> Customer {
    Customer {
        id: CustomerId::new(id),
        name,
        email,
        last_contact_date,
    }
}

fn record_from_row((id, customer_id, note, kind, created_at): InteractionRow) -> TxResult<InteractionRecord> {
    let interaction_type = InteractionType::parse(&kind)
        .map_err(|e| TransactionError::Storage(format!("interaction_log row {id}: {e}")))?;
    Ok(InteractionRecord {
        id: InteractionId::new(id),
        customer_id: CustomerId::new(customer_id),
        note,
        interaction_type,
        created_at,
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Entity Store backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool using the `database` config section.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unparsable URL and a transaction
    /// error when the server cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| Error::invalid_config(format!("database.url is not a valid Postgres URL: {e}")))?
            .options([
                ("lock_timeout", format!("{}ms", config.lock_timeout_ms)),
                ("statement_timeout", format!("{}ms", config.statement_timeout_ms)),
            ]);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_with(options)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            lock_timeout_ms = config.lock_timeout_ms,
            "Connected Postgres pool"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool. Session settings are whatever the pool has.
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables and index if missing.
    pub async fn bootstrap_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| Error::storage(format!("Failed to initialize schema: {e}")))
    }

    /// Ensure customers `1..=count` exist.
    pub async fn seed(&self, count: u32) -> Result<()> {
        let result = sqlx::query(SEED_CUSTOMERS)
            .bind(i64::from(count))
            .execute(&self.pool)
            .await?;
        tracing::info!(inserted = result.rows_affected(), count, "Seeded customers");
        Ok(())
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn begin(&self) -> TxResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn find_customer(&self, id: CustomerId) -> TxResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(SELECT_CUSTOMER)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(customer_from_row))
    }

    async fn find_interaction(&self, id: InteractionId) -> TxResult<Option<InteractionRecord>> {
        let row: Option<InteractionRow> = sqlx::query_as(SELECT_INTERACTION)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.map(record_from_row).transpose()
    }

    async fn interactions_for_customer(&self, id: CustomerId) -> TxResult<Vec<InteractionRecord>> {
        let rows: Vec<InteractionRow> = sqlx::query_as(SELECT_INTERACTIONS_FOR_CUSTOMER)
            .bind(id.get())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(record_from_row).collect()
    }

    async fn ping(&self) -> TxResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(TransactionError::from)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSACTION
// ═══════════════════════════════════════════════════════════════════════════

/// Dropping without commit rolls back (sqlx queues the rollback).
struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn select_customer_for_update(&mut self, id: CustomerId) -> TxResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(SELECT_CUSTOMER_FOR_UPDATE)
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(customer_from_row))
    }

    async fn insert_interaction(&mut self, new: &NewInteraction) -> TxResult<InteractionRecord> {
        let row: InteractionRow = sqlx::query_as(INSERT_INTERACTION)
            .bind(new.customer_id.get())
            .bind(&new.note)
            .bind(new.interaction_type.as_ref())
            .fetch_one(&mut *self.tx)
            .await?;
        record_from_row(row)
    }

    async fn touch_last_contact(&mut self, id: CustomerId) -> TxResult<DateTime<Utc>> {
        let stamp: Option<Option<DateTime<Utc>>> = sqlx::query_scalar(TOUCH_LAST_CONTACT)
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await?;
        stamp.flatten().ok_or_else(|| {
            TransactionError::Storage(format!("update matched no customer row for id {id}"))
        })
    }

    async fn commit(self: Box<Self>) -> TxResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| TransactionError::from(e).at_commit())
    }

    async fn rollback(self: Box<Self>) -> TxResult<()> {
        self.tx.rollback().await.map_err(TransactionError::from)
    }
}
