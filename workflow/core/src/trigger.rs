// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{RunId, WorkflowError};
use serde::{Deserialize, Serialize};

/// Body of a start request: `{ "numberOfItems": <positive integer> }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    #[serde(rename = "numberOfItems", default)]
    pub number_of_items: Option<i64>,
}

impl TriggerRequest {
    pub fn new(number_of_items: i64) -> Self {
        Self {
            number_of_items: Some(number_of_items),
        }
    }

    /// Malformed JSON is reported as a validation error
    pub fn from_json(body: &str) -> Result<Self, WorkflowError> {
        serde_json::from_str(body)
            .map_err(|e| WorkflowError::Validation(format!("invalid request body: {}", e)))
    }

    /// Requested item count, if it is positive and at most `max_items`
    pub fn validate(&self, max_items: usize) -> Result<usize, WorkflowError> {
        let requested = self.number_of_items.ok_or_else(|| {
            WorkflowError::Validation("numberOfItems is required".to_string())
        })?;

        if requested <= 0 {
            return Err(WorkflowError::Validation(format!(
                "numberOfItems must be positive, got {}",
                requested
            )));
        }

        let requested = usize::try_from(requested).map_err(|_| {
            WorkflowError::Validation(format!("numberOfItems {} is out of range", requested))
        })?;
        if requested > max_items {
            return Err(WorkflowError::Validation(format!(
                "numberOfItems {} exceeds the maximum of {}",
                requested, max_items
            )));
        }

        Ok(requested)
    }
}

/// Acknowledgement returned once a run has been created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerAck {
    pub run_id: RunId,
    pub message: String,
}
