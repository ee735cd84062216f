// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{compound_key, db_error, join_error, prefix};
use async_trait::async_trait;
use sled::{Batch, Db, Tree};
use tokio::task::spawn_blocking;
use workflow_core::{ResultStore, StoreError, StoredRecord};

const TREE: &str = "records";

/// Result records in a sled tree keyed by `partition_key \0 row_key`, stored as JSON
#[derive(Clone)]
pub struct SledDbResultStore {
    tree: Tree,
}

impl SledDbResultStore {
    pub fn new(db: &Db) -> Result<Self, StoreError> {
        Ok(Self {
            tree: db.open_tree(TREE).map_err(db_error)?,
        })
    }
}

fn record_key(record: &StoredRecord) -> Vec<u8> {
    compound_key(&record.partition_key, record.row_key.as_bytes())
}

fn decode(bytes: &[u8]) -> Result<StoredRecord, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn decode_all(
    entries: impl Iterator<Item = sled::Result<(sled::IVec, sled::IVec)>>,
) -> Result<Vec<StoredRecord>, StoreError> {
    entries
        .map(|entry| {
            let (_, value) = entry.map_err(db_error)?;
            decode(&value)
        })
        .collect()
}

#[async_trait]
impl ResultStore for SledDbResultStore {
    async fn upsert(&self, record: StoredRecord) -> Result<(), StoreError> {
        self.upsert_all(vec![record]).await
    }

    async fn get(&self, partition_key: &str, row_key: &str) -> Result<StoredRecord, StoreError> {
        let tree = self.tree.clone();
        let key = compound_key(partition_key, row_key.as_bytes());
        let missing = format!("{}/{}", partition_key, row_key);
        spawn_blocking(move || match tree.get(key).map_err(db_error)? {
            Some(value) => decode(&value),
            None => Err(StoreError::KeyNotFound(missing)),
        })
        .await
        .map_err(join_error)?
    }

    async fn scan(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let tree = self.tree.clone();
        spawn_blocking(move || decode_all(tree.iter()))
            .await
            .map_err(join_error)?
    }

    /// All records land in one atomic batch
    async fn upsert_all(&self, records: Vec<StoredRecord>) -> Result<(), StoreError> {
        let tree = self.tree.clone();
        spawn_blocking(move || -> Result<(), StoreError> {
            let mut batch = Batch::default();
            for record in &records {
                batch.insert(record_key(record), serde_json::to_vec(record)?);
            }
            tree.apply_batch(batch).map_err(db_error)?;
            tree.flush().map_err(db_error)?;
            Ok(())
        })
        .await
        .map_err(join_error)?
    }

    async fn scan_partition(&self, partition_key: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let tree = self.tree.clone();
        let prefix = prefix(partition_key);
        spawn_blocking(move || decode_all(tree.scan_prefix(prefix)))
            .await
            .map_err(join_error)?
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.tree.len())
    }

    async fn count_partition(&self, partition_key: &str) -> Result<usize, StoreError> {
        let tree = self.tree.clone();
        let prefix = prefix(partition_key);
        spawn_blocking(move || {
            let mut count = 0;
            for entry in tree.scan_prefix(prefix) {
                entry.map_err(db_error)?;
                count += 1;
            }
            Ok(count)
        })
        .await
        .map_err(join_error)?
    }
}
