// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    HistoryEvent, Phase, RunFailure, RunId, RunStatus, StepRecord, WorkflowError, WorkflowRun,
};
use merge_sort_core::{Chunk, SortedChunk, SortedResult};
use std::collections::BTreeMap;

/// What the coordinator has to do next for a run
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    Generate,
    Partition,
    /// Chunks with no recorded sort result; may be empty
    SortChunks(Vec<Chunk>),
    Merge,
    Store,
    Complete,
    /// Run is Completed or Failed
    Finished,
}

/// Coordinator state rebuilt purely from history.
///
/// `replay` and `apply` never look at anything but the events, so folding
/// the same history always yields the same state and the same `next_step`.
#[derive(Debug, Clone)]
pub struct RunState {
    run: WorkflowRun,
    items: Option<Vec<String>>,
    chunks: Option<Vec<Chunk>>,
    sorted: BTreeMap<usize, SortedChunk>,
    fan_out_completed: bool,
    result: Option<SortedResult>,
    stored_count: Option<usize>,
    failure: Option<RunFailure>,
    next_sequence: u64,
}

impl RunState {
    pub fn replay(run_id: &RunId, events: &[HistoryEvent]) -> Result<Self, WorkflowError> {
        let (first, rest) = events
            .split_first()
            .ok_or_else(|| WorkflowError::RunNotFound(run_id.clone()))?;

        let mut state = Self::from_created(run_id, first)?;
        for event in rest {
            state.apply(event)?;
        }
        Ok(state)
    }

    fn from_created(run_id: &RunId, event: &HistoryEvent) -> Result<Self, WorkflowError> {
        let corrupt = |reason: &str| WorkflowError::CorruptHistory {
            run_id: run_id.clone(),
            reason: reason.to_string(),
        };

        if event.run_id != *run_id {
            return Err(corrupt("first event belongs to another run"));
        }
        if event.sequence != 0 {
            return Err(corrupt("history does not start at sequence 0"));
        }

        match &event.record {
            StepRecord::RunCreated {
                number_of_items,
                parallelism,
                created_at,
            } => Ok(Self {
                run: WorkflowRun {
                    run_id: run_id.clone(),
                    number_of_items: *number_of_items,
                    parallelism: *parallelism,
                    phase: Phase::Created,
                    created_at: *created_at,
                },
                items: None,
                chunks: None,
                sorted: BTreeMap::new(),
                fan_out_completed: false,
                result: None,
                stored_count: None,
                failure: None,
                next_sequence: 1,
            }),
            _ => Err(corrupt("first event must be run_created")),
        }
    }

    fn corrupt(&self, event: &HistoryEvent, reason: &str) -> WorkflowError {
        WorkflowError::CorruptHistory {
            run_id: self.run.run_id.clone(),
            reason: format!(
                "event {} ({}): {}",
                event.sequence,
                event.step_name(),
                reason
            ),
        }
    }

    /// Folds one event into the state, rejecting anything a coordinator could not have written
    pub fn apply(&mut self, event: &HistoryEvent) -> Result<(), WorkflowError> {
        if event.run_id != self.run.run_id {
            return Err(self.corrupt(event, "belongs to another run"));
        }
        if event.sequence != self.next_sequence {
            return Err(self.corrupt(
                event,
                &format!("expected sequence {}", self.next_sequence),
            ));
        }
        if self.run.phase.is_terminal() {
            return Err(self.corrupt(event, "run already terminal"));
        }

        match &event.record {
            StepRecord::RunCreated { .. } => {
                return Err(self.corrupt(event, "run created twice"));
            }
            StepRecord::GenerationStarted => {}
            StepRecord::ItemsGenerated { items } => {
                if items.len() != self.run.number_of_items {
                    return Err(self.corrupt(
                        event,
                        &format!(
                            "{} items recorded, {} requested",
                            items.len(),
                            self.run.number_of_items
                        ),
                    ));
                }
                self.items = Some(items.clone());
            }
            StepRecord::InputPartitioned { chunks } => {
                if self.items.is_none() {
                    return Err(self.corrupt(event, "partitioned before generation"));
                }
                self.chunks = Some(chunks.clone());
            }
            StepRecord::FanOutStarted { chunk_count } => {
                if self.chunk_count() != Some(*chunk_count) {
                    return Err(self.corrupt(event, "chunk count does not match partition"));
                }
            }
            StepRecord::ChunkSorted { chunk } => {
                match self.chunk_count() {
                    Some(count) if chunk.index < count => {}
                    _ => return Err(self.corrupt(event, "sorted chunk was never partitioned")),
                }
                // A repeated delivery for the same index keeps the first result
                self.sorted
                    .entry(chunk.index)
                    .or_insert_with(|| chunk.clone());
            }
            StepRecord::FanOutCompleted => {
                if self.chunks.is_none() || !self.pending_chunks().is_empty() {
                    return Err(self.corrupt(event, "fan-out completed with chunks pending"));
                }
                self.fan_out_completed = true;
            }
            StepRecord::MergeStarted => {
                if !self.fan_out_completed {
                    return Err(self.corrupt(event, "merge started before fan-out completed"));
                }
            }
            StepRecord::ChunksMerged { result } => {
                if !self.fan_out_completed {
                    return Err(self.corrupt(event, "merged before fan-out completed"));
                }
                self.result = Some(result.clone());
            }
            StepRecord::StoreStarted => {
                if self.result.is_none() {
                    return Err(self.corrupt(event, "store started without a result"));
                }
            }
            StepRecord::ResultStored { record_count } => {
                if self.result.is_none() {
                    return Err(self.corrupt(event, "stored without a result"));
                }
                self.stored_count = Some(*record_count);
            }
            StepRecord::RunCompleted => {
                if self.stored_count.is_none() {
                    return Err(self.corrupt(event, "completed before storing"));
                }
            }
            StepRecord::RunFailed {
                phase,
                step,
                reason,
            } => {
                self.failure = Some(RunFailure {
                    phase: *phase,
                    step: step.clone(),
                    reason: reason.clone(),
                });
            }
        }

        self.run.phase = event.record.phase();
        self.next_sequence += 1;
        Ok(())
    }

    pub fn next_step(&self) -> NextStep {
        if self.run.phase.is_terminal() {
            return NextStep::Finished;
        }
        if self.items.is_none() {
            return NextStep::Generate;
        }
        if self.chunks.is_none() {
            return NextStep::Partition;
        }
        if !self.fan_out_completed {
            return NextStep::SortChunks(self.pending_chunks());
        }
        if self.result.is_none() {
            return NextStep::Merge;
        }
        if self.stored_count.is_none() {
            return NextStep::Store;
        }
        NextStep::Complete
    }

    /// Partitioned chunks that have no recorded sort result, in index order
    pub fn pending_chunks(&self) -> Vec<Chunk> {
        self.chunks
            .iter()
            .flatten()
            .filter(|chunk| !self.sorted.contains_key(&chunk.index))
            .cloned()
            .collect()
    }

    /// Recorded sort results in index order
    pub fn sorted_chunks(&self) -> Vec<SortedChunk> {
        self.sorted.values().cloned().collect()
    }

    pub fn is_chunk_sorted(&self, index: usize) -> bool {
        self.sorted.contains_key(&index)
    }

    pub fn chunk_count(&self) -> Option<usize> {
        self.chunks.as_ref().map(Vec::len)
    }

    pub fn items(&self) -> Option<&[String]> {
        self.items.as_deref()
    }

    pub fn result(&self) -> Option<&SortedResult> {
        self.result.as_ref()
    }

    pub fn run(&self) -> &WorkflowRun {
        &self.run
    }

    pub fn run_id(&self) -> &RunId {
        &self.run.run_id
    }

    pub fn phase(&self) -> Phase {
        self.run.phase
    }

    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn status(&self) -> RunStatus {
        let completed = self.run.phase == Phase::Completed;
        RunStatus {
            run_id: self.run.run_id.clone(),
            phase: self.run.phase,
            number_of_items: self.run.number_of_items,
            created_at: self.run.created_at,
            failure: self.failure.clone(),
            result_count: if completed { self.stored_count } else { None },
            result: if completed { self.result.clone() } else { None },
        }
    }
}
