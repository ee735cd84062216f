// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{merge_two, Chunk, SortedChunk};

/// Top-down recursive merge sort using ordinal (byte-wise) string order.
/// Stable: equal items keep their input order.
pub fn merge_sort(mut items: Vec<String>) -> Vec<String> {
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    merge_two(merge_sort(items), merge_sort(right))
}

/// Sorts one chunk. Has no side effects, so a retried call returns the same output.
pub fn sort_chunk(chunk: Chunk) -> SortedChunk {
    tracing::debug!(
        run_id = %chunk.run_id,
        chunk = chunk.index,
        items = chunk.items.len(),
        "sorting chunk"
    );

    SortedChunk {
        run_id: chunk.run_id,
        index: chunk.index,
        items: merge_sort(chunk.items),
    }
}
