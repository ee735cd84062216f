// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{HistoryEvent, HistoryStore, RunId, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Non-durable history log for tests and single-process runs
#[derive(Default)]
pub struct InMemoryHistoryStore {
    runs: Mutex<BTreeMap<RunId, Vec<HistoryEvent>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with existing history, e.g. a log captured before a crash
    pub fn with_events(events: Vec<HistoryEvent>) -> Self {
        let mut runs: BTreeMap<RunId, Vec<HistoryEvent>> = BTreeMap::new();
        for event in events {
            runs.entry(event.run_id.clone()).or_default().push(event);
        }
        Self {
            runs: Mutex::new(runs),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<RunId, Vec<HistoryEvent>>>, StoreError> {
        self.runs
            .lock()
            .map_err(|e| StoreError::Internal(format!("mutex poisoned: {:?}", e)))
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, event: HistoryEvent) -> Result<(), StoreError> {
        let mut runs = self.lock()?;
        let events = runs.entry(event.run_id.clone()).or_default();

        let expected = events.len() as u64;
        if event.sequence != expected {
            return Err(StoreError::SequenceConflict {
                expected,
                actual: event.sequence,
            });
        }

        events.push(event);
        Ok(())
    }

    async fn read(&self, run_id: &RunId) -> Result<Vec<HistoryEvent>, StoreError> {
        Ok(self.lock()?.get(run_id).cloned().unwrap_or_default())
    }

    async fn list_runs(&self) -> Result<Vec<RunId>, StoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
