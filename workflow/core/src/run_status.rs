// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Phase, RunId};
use chrono::{DateTime, Utc};
use merge_sort_core::SortedResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Phase the run was in when it failed
    pub phase: Phase,
    pub step: String,
    pub reason: String,
}

/// Answer to a status query. `result` is only present once the run is Completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub run_id: RunId,
    pub phase: Phase,
    pub number_of_items: usize,
    pub created_at: DateTime<Utc>,
    pub failure: Option<RunFailure>,
    pub result_count: Option<usize>,
    pub result: Option<SortedResult>,
}
