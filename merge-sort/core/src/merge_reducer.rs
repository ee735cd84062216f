// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{merge_two, AlgorithmError, SortedChunk, SortedResult};
use std::collections::BTreeMap;

/// Folds sorted chunks into one sorted result, in chunk index order.
///
/// Chunks may arrive in any order. Every index in `0..expected_chunks` must be present.
/// A repeated index is a duplicate delivery and only its first copy is used.
/// Ties resolve toward the lower chunk index.
pub fn merge_sorted_chunks(
    chunks: Vec<SortedChunk>,
    expected_chunks: usize,
) -> Result<SortedResult, AlgorithmError> {
    let mut by_index: BTreeMap<usize, SortedChunk> = BTreeMap::new();
    for chunk in chunks {
        if chunk.index >= expected_chunks {
            return Err(AlgorithmError::UnexpectedChunk {
                index: chunk.index,
                expected: expected_chunks,
            });
        }
        by_index.entry(chunk.index).or_insert(chunk);
    }

    let missing: Vec<usize> = (0..expected_chunks)
        .filter(|index| !by_index.contains_key(index))
        .collect();
    if !missing.is_empty() {
        return Err(AlgorithmError::IncompleteInput {
            expected: expected_chunks,
            missing,
        });
    }

    tracing::debug!(chunks = expected_chunks, "merging sorted chunks");
    let items = by_index
        .into_values()
        .fold(Vec::new(), |merged, chunk| merge_two(merged, chunk.items));

    Ok(SortedResult::new(items))
}
