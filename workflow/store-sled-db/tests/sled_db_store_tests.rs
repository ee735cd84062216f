// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chrono::Utc;
use workflow_core::{
    HistoryEvent, HistoryStore, Phase, ResultStore, RunId, StepRecord, StoreError, StoredRecord,
};
use workflow_store_sled_db::{SledDbHistoryStore, SledDbResultStore};

fn temporary_db() -> sled::Db {
    sled::Config::new().temporary(true).open().unwrap()
}

fn created() -> StepRecord {
    StepRecord::RunCreated {
        number_of_items: 4,
        parallelism: 2,
        created_at: Utc::now(),
    }
}

// ============================================================
// History
// ============================================================

#[tokio::test]
async fn test_history_round_trips_every_record_kind() {
    let store = SledDbHistoryStore::new(&temporary_db()).unwrap();
    let run_id = RunId::new("run-1");
    let records = vec![
        created(),
        StepRecord::GenerationStarted,
        StepRecord::ItemsGenerated {
            items: vec!["b".to_string(), "a".to_string()],
        },
        StepRecord::RunFailed {
            phase: Phase::Generating,
            step: "generate_items".to_string(),
            reason: "boom".to_string(),
        },
    ];
    for (seq, record) in records.iter().cloned().enumerate() {
        store
            .append(HistoryEvent::new(run_id.clone(), seq as u64, record))
            .await
            .unwrap();
    }

    let events = store.read(&run_id).await.unwrap();
    let read_back: Vec<StepRecord> = events.into_iter().map(|e| e.record).collect();
    assert_eq!(read_back, records);
}

#[tokio::test]
async fn test_history_keeps_order_past_255_events() {
    let store = SledDbHistoryStore::new(&temporary_db()).unwrap();
    let run_id = RunId::new("run-1");
    store
        .append(HistoryEvent::new(run_id.clone(), 0, created()))
        .await
        .unwrap();
    for seq in 1..300u64 {
        store
            .append(HistoryEvent::new(run_id.clone(), seq, StepRecord::GenerationStarted))
            .await
            .unwrap();
    }

    let sequences: Vec<u64> = store
        .read(&run_id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.sequence)
        .collect();
    assert_eq!(sequences, (0..300).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_history_rejects_sequence_conflict() {
    let store = SledDbHistoryStore::new(&temporary_db()).unwrap();
    let run_id = RunId::new("run-1");
    store
        .append(HistoryEvent::new(run_id.clone(), 0, created()))
        .await
        .unwrap();

    let result = store
        .append(HistoryEvent::new(run_id.clone(), 0, created()))
        .await;
    assert_eq!(
        result,
        Err(StoreError::SequenceConflict {
            expected: 1,
            actual: 0
        })
    );
    assert_eq!(store.read(&run_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_history_runs_do_not_bleed_into_each_other() {
    let store = SledDbHistoryStore::new(&temporary_db()).unwrap();
    for id in ["run-a", "run-ab", "run"] {
        store
            .append(HistoryEvent::new(RunId::new(id), 0, created()))
            .await
            .unwrap();
    }
    store
        .append(HistoryEvent::new(RunId::new("run-a"), 1, StepRecord::GenerationStarted))
        .await
        .unwrap();

    assert_eq!(store.read(&RunId::new("run-a")).await.unwrap().len(), 2);
    assert_eq!(store.read(&RunId::new("run-ab")).await.unwrap().len(), 1);
    assert!(store.read(&RunId::new("run-b")).await.unwrap().is_empty());
    assert_eq!(
        store.list_runs().await.unwrap(),
        vec![RunId::new("run"), RunId::new("run-a"), RunId::new("run-ab")]
    );
}

// ============================================================
// Records
// ============================================================

#[tokio::test]
async fn test_records_upsert_overwrites_and_scans_in_key_order() {
    let store = SledDbResultStore::new(&temporary_db()).unwrap();
    store.upsert(StoredRecord::new("run-1", "0000000001", "b")).await.unwrap();
    store.upsert(StoredRecord::new("run-1", "0000000000", "a")).await.unwrap();
    store.upsert(StoredRecord::new("run-1", "0000000001", "c")).await.unwrap();
    store.upsert(StoredRecord::new("run-2", "0000000000", "z")).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 3);
    assert_eq!(store.count_partition("run-1").await.unwrap(), 2);
    assert_eq!(store.get("run-1", "0000000001").await.unwrap().value, "c");

    let values: Vec<String> = store
        .scan_partition("run-1")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.value)
        .collect();
    assert_eq!(values, vec!["a".to_string(), "c".to_string()]);
}

#[tokio::test]
async fn test_records_missing_key() {
    let store = SledDbResultStore::new(&temporary_db()).unwrap();
    assert!(matches!(
        store.get("run-1", "0000000000").await,
        Err(StoreError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn test_records_batch_upsert_is_idempotent() {
    let store = SledDbResultStore::new(&temporary_db()).unwrap();
    let records: Vec<StoredRecord> = ["x", "y", "z"]
        .iter()
        .enumerate()
        .map(|(i, v)| StoredRecord::for_result(&RunId::new("run-1"), i, v))
        .collect();

    store.upsert_all(records.clone()).await.unwrap();
    let once = store.scan().await.unwrap();
    store.upsert_all(records).await.unwrap();

    assert_eq!(store.scan().await.unwrap(), once);
    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_history_and_records_share_one_db() {
    let db = temporary_db();
    let history = SledDbHistoryStore::new(&db).unwrap();
    let records = SledDbResultStore::new(&db).unwrap();

    history
        .append(HistoryEvent::new(RunId::new("run-1"), 0, created()))
        .await
        .unwrap();
    records
        .upsert(StoredRecord::new("run-1", "0000000000", "a"))
        .await
        .unwrap();

    assert_eq!(records.count().await.unwrap(), 1);
    assert_eq!(history.list_runs().await.unwrap(), vec![RunId::new("run-1")]);
}
