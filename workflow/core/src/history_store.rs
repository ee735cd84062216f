// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{HistoryEvent, RunId, StoreError};
use async_trait::async_trait;

/// Durable append-only log of history events, keyed by run
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends one event.
    ///
    /// # Arguments
    /// * `event` - its `sequence` must equal the number of events already stored for the run
    ///
    /// # Returns
    /// * `Ok(())` - the event is durable
    /// * `Err(StoreError::SequenceConflict)` - another writer got there first, nothing written
    async fn append(&self, event: HistoryEvent) -> Result<(), StoreError>;

    /// All events of a run in append order. Unknown runs yield an empty list.
    async fn read(&self, run_id: &RunId) -> Result<Vec<HistoryEvent>, StoreError>;

    /// Identifiers of every run with at least one event, sorted
    async fn list_runs(&self) -> Result<Vec<RunId>, StoreError>;
}
