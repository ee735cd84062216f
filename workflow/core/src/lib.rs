// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod run_id;
pub use run_id::RunId;

mod phase;
pub use phase::Phase;

mod workflow_run;
pub use workflow_run::WorkflowRun;

mod history_event;
pub use history_event::{HistoryEvent, StepRecord};

mod store_error;
pub use store_error::StoreError;

mod history_store;
pub use history_store::HistoryStore;

mod stored_record;
pub use stored_record::{StoredRecord, AD_HOC_PARTITION};

mod result_store;
pub use result_store::ResultStore;

mod in_memory_history_store;
pub use in_memory_history_store::InMemoryHistoryStore;

mod in_memory_result_store;
pub use in_memory_result_store::InMemoryResultStore;

mod step_failure;
pub use step_failure::{FailureKind, StepFailure};

mod workflow_error;
pub use workflow_error::WorkflowError;

mod workflow_config;
pub use workflow_config::WorkflowConfig;

pub mod random;
pub use random::{FastrandRandom, Random};

pub mod timer;
pub use timer::{Timer, TokioTimer};

mod retry;
pub use retry::{run_with_retry, RetryError, RetryPolicy};

mod sort_worker;
pub use sort_worker::{MergeSortWorker, SortWorker};

mod fan_out;
pub use fan_out::{ChunkOutcome, FanOutHandle, SortFanOut};

mod result_sink;
pub use result_sink::ResultSink;

mod run_state;
pub use run_state::{NextStep, RunState};

mod run_status;
pub use run_status::{RunFailure, RunStatus};

mod trigger;
pub use trigger::{TriggerAck, TriggerRequest};

mod coordinator;
pub use coordinator::Coordinator;
