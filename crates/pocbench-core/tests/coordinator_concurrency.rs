//! Row-lock behavior of CreateInteraction under concurrent callers.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::Utc;
use common::{coordinator_over, seeded_store, RecordingStore};
use pocbench_core::{CustomerId, EntityStore, Error, TransactionError};
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_customer_calls_all_succeed_without_lost_updates() {
    const CALLS: usize = 50;
    let memory = seeded_store(&[10], Duration::from_secs(10));
    let recorder = RecordingStore::new(Arc::new(memory.clone()));
    let coordinator = Arc::new(coordinator_over(recorder.clone()));

    let mut set = JoinSet::new();
    for i in 0..CALLS {
        let coordinator = Arc::clone(&coordinator);
        set.spawn(async move {
            coordinator
                .create_interaction(10, &format!("note {i}"), "CALL")
                .await
        });
    }

    let mut ids = HashSet::new();
    while let Some(joined) = set.join_next().await {
        let record = joined.expect("task").expect("create interaction");
        assert!(ids.insert(record.id), "duplicate id {}", record.id);
    }
    let joined_at = Utc::now();
    assert_eq!(ids.len(), CALLS);

    let records = memory
        .interactions_for_customer(CustomerId::new(10))
        .await
        .unwrap();
    assert_eq!(records.len(), CALLS);

    let newest = records.iter().map(|r| r.created_at).max().unwrap();
    let customer = memory.find_customer(CustomerId::new(10)).await.unwrap().unwrap();
    let last_contact = customer.last_contact_date.unwrap();
    assert!(newest <= last_contact, "{last_contact} older than newest insert {newest}");
    assert!(last_contact <= joined_at, "{last_contact} later than all joins {joined_at}");

    // Stamps are taken under the row lock, so the latest commit holds the max.
    let stamps = recorder.committed_stamps();
    assert_eq!(stamps.len(), CALLS);
    assert_eq!(Some(last_contact), stamps.into_iter().max());
}

#[tokio::test]
async fn held_lock_on_one_customer_does_not_block_another() {
    let memory = seeded_store(&[1, 2], Duration::from_secs(5));
    let coordinator = coordinator_over(Arc::new(memory.clone()));

    let mut holder = memory.begin().await.unwrap();
    assert!(holder
        .select_customer_for_update(CustomerId::new(1))
        .await
        .unwrap()
        .is_some());

    let other = tokio::time::timeout(
        Duration::from_secs(1),
        coordinator.create_interaction(2, "x", "EMAIL"),
    )
    .await
    .expect("customer 2 must not wait on customer 1");
    assert!(other.is_ok());

    holder.rollback().await.unwrap();
}

#[tokio::test]
async fn second_caller_waits_for_first_commit() {
    let memory = seeded_store(&[1], Duration::from_secs(5));
    let coordinator = Arc::new(coordinator_over(Arc::new(memory.clone())));

    let mut holder = memory.begin().await.unwrap();
    holder
        .select_customer_for_update(CustomerId::new(1))
        .await
        .unwrap();

    let waiting = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.create_interaction(1, "x", "CALL").await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!waiting.is_finished());
    assert_eq!(memory.interaction_count().unwrap(), 0);

    holder.commit().await.unwrap();
    let record = waiting.await.unwrap().unwrap();
    assert_eq!(record.customer_id, CustomerId::new(1));
}

#[tokio::test]
async fn lock_wait_timeout_is_a_transaction_error_with_no_effects() {
    let memory = seeded_store(&[1], Duration::from_millis(50));
    let coordinator = coordinator_over(Arc::new(memory.clone()));

    let mut holder = memory.begin().await.unwrap();
    holder
        .select_customer_for_update(CustomerId::new(1))
        .await
        .unwrap();

    let err = coordinator
        .create_interaction(1, "x", "CALL")
        .await
        .unwrap_err();
    assert_eq!(err, Error::Transaction(TransactionError::LockTimeout));
    assert_eq!(err.public_message(), "Transaction failed");
    assert!(err.is_retryable());

    holder.rollback().await.unwrap();
    assert_eq!(memory.interaction_count().unwrap(), 0);
    let customer = memory.find_customer(CustomerId::new(1)).await.unwrap().unwrap();
    assert_eq!(customer.last_contact_date, None);
}
