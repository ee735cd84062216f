// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Point lookup on a (partition, row) pair that was never written
    #[error("key '{0}' not found")]
    KeyNotFound(String),

    /// History append whose sequence number is not the next free slot
    #[error("sequence conflict: expected {expected}, actual {actual}")]
    SequenceConflict { expected: u64, actual: u64 },

    /// Stored bytes could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O, poisoned lock, backend failure
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
