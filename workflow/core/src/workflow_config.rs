// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{RetryPolicy, WorkflowError};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Target number of chunks sorted concurrently
    pub parallelism: usize,
    /// Largest accepted `numberOfItems`
    pub max_items: usize,
    pub retry: RetryPolicy,
    pub completion_channel_capacity: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            max_items: 100_000,
            retry: RetryPolicy::default(),
            completion_channel_capacity: 16,
        }
    }
}

impl WorkflowConfig {
    /// Reads a JSON config file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, WorkflowError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| WorkflowError::Config(format!("{}: {}", path.display(), e)))?;
        let config: WorkflowConfig = serde_json::from_str(&contents)
            .map_err(|e| WorkflowError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.parallelism == 0 {
            return Err(WorkflowError::Config("parallelism must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(WorkflowError::Config(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(WorkflowError::Config(
                "retry.backoff_multiplier must be >= 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_ratio) {
            return Err(WorkflowError::Config(
                "retry.jitter_ratio must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}
