// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a run:
/// Created -> Generating -> Partitioned -> SortingFanOut -> Merging -> Storing -> Completed,
/// with Failed reachable from any non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Created,
    Generating,
    Partitioned,
    SortingFanOut,
    Merging,
    Storing,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Created => "Created",
            Phase::Generating => "Generating",
            Phase::Partitioned => "Partitioned",
            Phase::SortingFanOut => "SortingFanOut",
            Phase::Merging => "Merging",
            Phase::Storing => "Storing",
            Phase::Completed => "Completed",
            Phase::Failed => "Failed",
        };
        f.pad(s)
    }
}
