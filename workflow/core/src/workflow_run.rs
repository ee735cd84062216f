// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Phase, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One execution of the merge-sort workflow. Only the coordinator advances `phase`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub run_id: RunId,
    pub number_of_items: usize,
    pub parallelism: usize,
    pub phase: Phase,
    pub created_at: DateTime<Utc>,
}
