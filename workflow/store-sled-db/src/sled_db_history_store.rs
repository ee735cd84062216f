// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{compound_key, db_error, join_error, prefix, KEY_SEPARATOR};
use async_trait::async_trait;
use sled::{Db, Tree};
use tokio::task::spawn_blocking;
use workflow_core::{HistoryEvent, HistoryStore, RunId, StoreError};

const TREE: &str = "history";

/// History events in a sled tree, keyed by run id and big-endian sequence
/// so a prefix scan returns a run's events in append order. Values are bincode.
#[derive(Clone)]
pub struct SledDbHistoryStore {
    tree: Tree,
}

impl SledDbHistoryStore {
    pub fn new(db: &Db) -> Result<Self, StoreError> {
        Ok(Self {
            tree: db.open_tree(TREE).map_err(db_error)?,
        })
    }
}

fn event_key(run_id: &RunId, sequence: u64) -> Vec<u8> {
    compound_key(run_id.as_str(), &sequence.to_be_bytes())
}

fn decode(bytes: &[u8]) -> Result<HistoryEvent, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl HistoryStore for SledDbHistoryStore {
    async fn append(&self, event: HistoryEvent) -> Result<(), StoreError> {
        let tree = self.tree.clone();
        spawn_blocking(move || {
            let expected = match tree
                .scan_prefix(prefix(event.run_id.as_str()))
                .next_back()
                .transpose()
                .map_err(db_error)?
            {
                Some((_, value)) => decode(&value)?.sequence + 1,
                None => 0,
            };
            if event.sequence != expected {
                return Err(StoreError::SequenceConflict {
                    expected,
                    actual: event.sequence,
                });
            }

            let value = bincode::serialize(&event)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            let key = event_key(&event.run_id, event.sequence);

            // Another writer may have taken this sequence since the scan
            if tree
                .compare_and_swap(key, None as Option<&[u8]>, Some(value))
                .map_err(db_error)?
                .is_err()
            {
                return Err(StoreError::SequenceConflict {
                    expected: expected + 1,
                    actual: event.sequence,
                });
            }
            tree.flush().map_err(db_error)?;
            Ok(())
        })
        .await
        .map_err(join_error)?
    }

    async fn read(&self, run_id: &RunId) -> Result<Vec<HistoryEvent>, StoreError> {
        let tree = self.tree.clone();
        let prefix = prefix(run_id.as_str());
        spawn_blocking(move || {
            tree.scan_prefix(prefix)
                .map(|entry| {
                    let (_, value) = entry.map_err(db_error)?;
                    decode(&value)
                })
                .collect()
        })
        .await
        .map_err(join_error)?
    }

    async fn list_runs(&self) -> Result<Vec<RunId>, StoreError> {
        let tree = self.tree.clone();
        spawn_blocking(move || {
            let mut runs = Vec::new();
            for entry in tree.iter() {
                let (key, _) = entry.map_err(db_error)?;
                let Some(split) = key.iter().position(|b| *b == KEY_SEPARATOR) else {
                    tracing::warn!("skipping history key without separator");
                    continue;
                };
                let (id, sequence) = (&key[..split], &key[split + 1..]);
                if sequence != 0u64.to_be_bytes() {
                    continue;
                }
                match std::str::from_utf8(id) {
                    Ok(id) => runs.push(RunId::new(id)),
                    Err(e) => tracing::warn!(error = %e, "skipping non UTF-8 run id"),
                }
            }
            runs.sort();
            Ok(runs)
        })
        .await
        .map_err(join_error)?
    }
}
