// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod sled_db_history_store;
pub use sled_db_history_store::SledDbHistoryStore;

mod sled_db_result_store;
pub use sled_db_result_store::SledDbResultStore;

use std::path::Path;
use workflow_core::StoreError;

const KEY_SEPARATOR: u8 = 0;

/// Opens (or creates) the database both stores share
pub fn open_db(path: impl AsRef<Path>) -> Result<sled::Db, StoreError> {
    sled::open(path).map_err(db_error)
}

fn db_error(e: sled::Error) -> StoreError {
    StoreError::Internal(e.to_string())
}

fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::Internal(format!("Task panicked: {:?}", e))
}

/// `first \0 second`, so a prefix scan on `first \0` selects one group
fn compound_key(first: &str, second: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(first.len() + 1 + second.len());
    key.extend_from_slice(first.as_bytes());
    key.push(KEY_SEPARATOR);
    key.extend_from_slice(second);
    key
}

fn prefix(first: &str) -> Vec<u8> {
    compound_key(first, &[])
}
