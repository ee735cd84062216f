// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Phase, RunId};
use chrono::{DateTime, Utc};
use merge_sort_core::{Chunk, SortedChunk, SortedResult};
use serde::{Deserialize, Serialize};

/// Immutable entry of a run's append-only history.
/// `sequence` starts at 0 and has no gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub run_id: RunId,
    pub sequence: u64,
    pub record: StepRecord,
}

impl HistoryEvent {
    pub fn new(run_id: RunId, sequence: u64, record: StepRecord) -> Self {
        Self {
            run_id,
            sequence,
            record,
        }
    }

    pub fn step_name(&self) -> &'static str {
        self.record.step_name()
    }
}

/// What happened at one step boundary, with the step's result when it has one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepRecord {
    RunCreated {
        number_of_items: usize,
        parallelism: usize,
        created_at: DateTime<Utc>,
    },
    GenerationStarted,
    ItemsGenerated {
        items: Vec<String>,
    },
    InputPartitioned {
        chunks: Vec<Chunk>,
    },
    FanOutStarted {
        chunk_count: usize,
    },
    ChunkSorted {
        chunk: SortedChunk,
    },
    FanOutCompleted,
    MergeStarted,
    ChunksMerged {
        result: SortedResult,
    },
    StoreStarted,
    ResultStored {
        record_count: usize,
    },
    RunCompleted,
    RunFailed {
        phase: Phase,
        step: String,
        reason: String,
    },
}

impl StepRecord {
    pub fn step_name(&self) -> &'static str {
        match self {
            StepRecord::RunCreated { .. } => "run_created",
            StepRecord::GenerationStarted => "generation_started",
            StepRecord::ItemsGenerated { .. } => "items_generated",
            StepRecord::InputPartitioned { .. } => "input_partitioned",
            StepRecord::FanOutStarted { .. } => "fan_out_started",
            StepRecord::ChunkSorted { .. } => "chunk_sorted",
            StepRecord::FanOutCompleted => "fan_out_completed",
            StepRecord::MergeStarted => "merge_started",
            StepRecord::ChunksMerged { .. } => "chunks_merged",
            StepRecord::StoreStarted => "store_started",
            StepRecord::ResultStored { .. } => "result_stored",
            StepRecord::RunCompleted => "run_completed",
            StepRecord::RunFailed { .. } => "run_failed",
        }
    }

    /// Phase the run is in once this record is applied
    pub fn phase(&self) -> Phase {
        match self {
            StepRecord::RunCreated { .. } => Phase::Created,
            StepRecord::GenerationStarted | StepRecord::ItemsGenerated { .. } => Phase::Generating,
            StepRecord::InputPartitioned { .. } => Phase::Partitioned,
            StepRecord::FanOutStarted { .. }
            | StepRecord::ChunkSorted { .. }
            | StepRecord::FanOutCompleted => Phase::SortingFanOut,
            StepRecord::MergeStarted | StepRecord::ChunksMerged { .. } => Phase::Merging,
            StepRecord::StoreStarted | StepRecord::ResultStored { .. } => Phase::Storing,
            StepRecord::RunCompleted => Phase::Completed,
            StepRecord::RunFailed { .. } => Phase::Failed,
        }
    }
}
