// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{ResultStore, RunId, StepFailure, StoredRecord};
use merge_sort_core::SortedResult;
use std::sync::Arc;

/// Persists a run's sorted result, one record per item.
///
/// Row keys are derived from the item position, so a repeated or partially
/// completed write is repaired by writing the whole result again.
#[derive(Clone)]
pub struct ResultSink {
    store: Arc<dyn ResultStore>,
}

impl ResultSink {
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    /// Returns the number of records visible for the run after the write
    pub async fn persist(
        &self,
        run_id: &RunId,
        result: &SortedResult,
    ) -> Result<usize, StepFailure> {
        let records: Vec<StoredRecord> = result
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| StoredRecord::for_result(run_id, position, item))
            .collect();

        tracing::info!(run_id = %run_id, records = records.len(), "storing sorted result");
        self.store.upsert_all(records).await?;

        let visible = self.store.count_partition(run_id.as_str()).await?;
        if visible != result.len() {
            return Err(StepFailure::transient(format!(
                "expected {} visible records for run '{}', found {}",
                result.len(),
                run_id,
                visible
            )));
        }

        Ok(visible)
    }
}
