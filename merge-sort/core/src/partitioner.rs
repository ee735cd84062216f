// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{AlgorithmError, Chunk};

/// Sizes of a balanced split of `len` items into at most `parallelism` chunks.
/// The first `len % n` chunks carry one extra item; no size is ever zero.
pub fn chunk_sizes(len: usize, parallelism: usize) -> Result<Vec<usize>, AlgorithmError> {
    if parallelism == 0 {
        return Err(AlgorithmError::InvalidParallelism);
    }

    let chunk_count = parallelism.min(len);
    if chunk_count == 0 {
        return Ok(Vec::new());
    }

    let base = len / chunk_count;
    let remainder = len % chunk_count;
    Ok((0..chunk_count)
        .map(|index| base + usize::from(index < remainder))
        .collect())
}

/// Splits `items` into contiguous, index-tagged chunks in input order
pub fn partition(
    run_id: &str,
    items: Vec<String>,
    parallelism: usize,
) -> Result<Vec<Chunk>, AlgorithmError> {
    let sizes = chunk_sizes(items.len(), parallelism)?;
    let mut remaining = items.into_iter();

    let chunks: Vec<Chunk> = sizes
        .into_iter()
        .enumerate()
        .map(|(index, size)| Chunk::new(run_id, index, remaining.by_ref().take(size).collect()))
        .collect();

    tracing::debug!(
        run_id,
        chunks = chunks.len(),
        parallelism,
        "partitioned input"
    );
    Ok(chunks)
}
