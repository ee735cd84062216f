// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{ResultStore, StoreError, StoredRecord};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

type Table = BTreeMap<(String, String), String>;

/// Non-durable result table for tests and single-process runs
#[derive(Default)]
pub struct InMemoryResultStore {
    table: Mutex<Table>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, StoreError> {
        self.table
            .lock()
            .map_err(|e| StoreError::Internal(format!("mutex poisoned: {:?}", e)))
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn upsert(&self, record: StoredRecord) -> Result<(), StoreError> {
        self.lock()?
            .insert((record.partition_key, record.row_key), record.value);
        Ok(())
    }

    async fn get(&self, partition_key: &str, row_key: &str) -> Result<StoredRecord, StoreError> {
        self.lock()?
            .get(&(partition_key.to_string(), row_key.to_string()))
            .map(|value| StoredRecord::new(partition_key, row_key, value))
            .ok_or_else(|| StoreError::KeyNotFound(format!("{}/{}", partition_key, row_key)))
    }

    async fn scan(&self) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .map(|((partition_key, row_key), value)| {
                StoredRecord::new(partition_key, row_key, value)
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }
}
