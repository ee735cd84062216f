// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{StoreError, StoredRecord};
use async_trait::async_trait;

/// Table of persisted results, addressed by (partition_key, row_key).
/// Implementations handle concurrency internally.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Insert or overwrite the record under its key
    async fn upsert(&self, record: StoredRecord) -> Result<(), StoreError>;

    /// Returns `StoreError::KeyNotFound` if nothing is stored under the key
    async fn get(&self, partition_key: &str, row_key: &str) -> Result<StoredRecord, StoreError>;

    /// Every record, ordered by (partition_key, row_key)
    async fn scan(&self) -> Result<Vec<StoredRecord>, StoreError>;

    async fn upsert_all(&self, records: Vec<StoredRecord>) -> Result<(), StoreError> {
        for record in records {
            self.upsert(record).await?;
        }
        Ok(())
    }

    async fn scan_partition(&self, partition_key: &str) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self
            .scan()
            .await?
            .into_iter()
            .filter(|record| record.partition_key == partition_key)
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.scan().await?.len())
    }

    async fn count_partition(&self, partition_key: &str) -> Result<usize, StoreError> {
        Ok(self.scan_partition(partition_key).await?.len())
    }
}
