// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::RunId;
use serde::{Deserialize, Serialize};

/// Partition used for records inserted outside of a workflow run
pub const AD_HOC_PARTITION: &str = "SortedNames";

/// One persisted item, addressed by (partition_key, row_key)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoredRecord {
    pub partition_key: String,
    pub row_key: String,
    pub value: String,
}

impl StoredRecord {
    pub fn new(partition_key: &str, row_key: &str, value: &str) -> Self {
        Self {
            partition_key: partition_key.to_string(),
            row_key: row_key.to_string(),
            value: value.to_string(),
        }
    }

    /// Record for position `position` of a run's sorted result. The key is derived, never
    /// random, so writing the same result twice overwrites instead of duplicating.
    pub fn for_result(run_id: &RunId, position: usize, value: &str) -> Self {
        Self {
            partition_key: run_id.to_string(),
            row_key: Self::row_key_for(position),
            value: value.to_string(),
        }
    }

    /// Zero padded so lexicographic key order equals position order
    pub fn row_key_for(position: usize) -> String {
        format!("{:010}", position)
    }

    /// Record for the shared ad-hoc partition under a fresh unique row key
    pub fn ad_hoc(value: &str) -> Self {
        Self {
            partition_key: AD_HOC_PARTITION.to_string(),
            row_key: uuid::Uuid::new_v4().to_string(),
            value: value.to_string(),
        }
    }
}
