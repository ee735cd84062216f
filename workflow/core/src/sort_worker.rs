// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::StepFailure;
use async_trait::async_trait;
use merge_sort_core::{sort_chunk, Chunk, SortedChunk};
use tokio::task::spawn_blocking;

/// Sorts exactly one chunk. May be invoked more than once for the same chunk.
#[async_trait]
pub trait SortWorker: Send + Sync {
    async fn sort(&self, chunk: Chunk) -> Result<SortedChunk, StepFailure>;
}

/// Runs the recursive merge sort on the blocking pool
pub struct MergeSortWorker;

#[async_trait]
impl SortWorker for MergeSortWorker {
    async fn sort(&self, chunk: Chunk) -> Result<SortedChunk, StepFailure> {
        spawn_blocking(move || sort_chunk(chunk))
            .await
            .map_err(|e| StepFailure::transient(format!("sort task panicked: {:?}", e)))
    }
}
