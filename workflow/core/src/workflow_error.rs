// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Phase, RunId, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad trigger input; no run was created
    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("run '{0}' not found")]
    RunNotFound(RunId),

    /// Persisted history cannot be replayed
    #[error("corrupt history for run '{run_id}': {reason}")]
    CorruptHistory { run_id: RunId, reason: String },

    /// The reducer was handed fewer chunks than were partitioned. The run is failed.
    #[error("run '{run_id}' failed: incomplete merge input, missing chunks {missing:?}")]
    IncompleteInput { run_id: RunId, missing: Vec<usize> },

    /// A step failed permanently or ran out of attempts. The run is failed.
    #[error("run '{run_id}' failed in {phase} at '{step}' after {attempts} attempt(s): {reason}")]
    StepFailed {
        run_id: RunId,
        phase: Phase,
        step: String,
        attempts: u32,
        reason: String,
    },

    /// Stopped at a step boundary; the run can be resumed
    #[error("run '{run_id}' cancelled during {phase}")]
    Cancelled { run_id: RunId, phase: Phase },

    #[error(transparent)]
    Store(#[from] StoreError),
}
