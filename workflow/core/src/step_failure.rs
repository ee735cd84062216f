// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::StoreError;
use merge_sort_core::AlgorithmError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Worth another attempt
    Transient,
    /// Retrying cannot help
    Fatal,
}

/// Error returned by one attempt of a workflow step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?} failure: {message}")]
pub struct StepFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl StepFailure {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transient,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Fatal,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == FailureKind::Transient
    }
}

impl From<StoreError> for StepFailure {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Serialization(_) => StepFailure::fatal(e.to_string()),
            _ => StepFailure::transient(e.to_string()),
        }
    }
}

impl From<AlgorithmError> for StepFailure {
    fn from(e: AlgorithmError) -> Self {
        StepFailure::fatal(e.to_string())
    }
}
