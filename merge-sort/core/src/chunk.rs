// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};

/// Contiguous slice of the generated input, owned by one sort worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub run_id: String,
    pub index: usize,
    pub items: Vec<String>,
}

impl Chunk {
    pub fn new(run_id: &str, index: usize, items: Vec<String>) -> Self {
        Self {
            run_id: run_id.to_string(),
            index,
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A chunk whose items are in non-decreasing ordinal order.
/// Keeps the index of the chunk it was sorted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedChunk {
    pub run_id: String,
    pub index: usize,
    pub items: Vec<String>,
}

impl SortedChunk {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Globally sorted output of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedResult {
    pub items: Vec<String>,
}

impl SortedResult {
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.items.windows(2).all(|pair| pair[0] <= pair[1])
    }
}
