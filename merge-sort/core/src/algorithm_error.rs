// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgorithmError {
    /// Requested item count is above the configured generator maximum
    #[error("generation failed: requested {requested} items, maximum is {max}")]
    GenerationFailed { requested: usize, max: usize },

    /// Partitioning into zero chunks was requested
    #[error("parallelism must be at least 1")]
    InvalidParallelism,

    /// One or more expected chunk indices never reached the reducer
    #[error("incomplete input: expected {expected} chunks, missing indices {missing:?}")]
    IncompleteInput { expected: usize, missing: Vec<usize> },

    /// A chunk index outside 0..expected reached the reducer
    #[error("unexpected chunk index {index}, expected fewer than {expected}")]
    UnexpectedChunk { index: usize, expected: usize },
}
