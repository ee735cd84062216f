// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    run_with_retry, FastrandRandom, HistoryEvent, HistoryStore, MergeSortWorker, NextStep, Phase,
    Random, ResultSink, ResultStore, RetryError, RunId, RunState, RunStatus, SortFanOut,
    SortWorker, StepFailure, StepRecord, Timer, TokioTimer, TriggerAck, TriggerRequest,
    WorkflowConfig, WorkflowError,
};
use chrono::Utc;
use merge_sort_core::{
    merge_sorted_chunks, partition, AlgorithmError, Chunk, DataGenerator, FakeNameGenerator,
};
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tokio_util::sync::CancellationToken;

/// How a fan-out round stopped early
enum FanOutStop {
    Failed {
        step: String,
        attempts: u32,
        reason: String,
    },
    Cancelled,
    Store(WorkflowError),
}

/// Drives workflow runs through their phases, recording every step in the
/// history store before moving on.
///
/// Control flow is a function of the persisted history only: `run` replays the
/// log into a [`RunState`], asks it for the next step, executes that step and
/// appends its result. Clock and randomness are read in `create_run` alone,
/// and their values are persisted in the `RunCreated` event.
pub struct Coordinator {
    config: WorkflowConfig,
    history: Arc<dyn HistoryStore>,
    sink: ResultSink,
    generator: Arc<dyn DataGenerator>,
    worker: Arc<dyn SortWorker>,
    timer: Arc<dyn Timer>,
    random: Arc<dyn Random>,
    cancellation_token: CancellationToken,
}

impl Coordinator {
    pub fn new(
        config: WorkflowConfig,
        history: Arc<dyn HistoryStore>,
        results: Arc<dyn ResultStore>,
    ) -> Self {
        let generator = Arc::new(FakeNameGenerator::new(config.max_items));
        Self {
            config,
            history,
            sink: ResultSink::new(results),
            generator,
            worker: Arc::new(MergeSortWorker),
            timer: Arc::new(TokioTimer),
            random: Arc::new(FastrandRandom),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn DataGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_sort_worker(mut self, worker: Arc<dyn SortWorker>) -> Self {
        self.worker = worker;
        self
    }

    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn Random>) -> Self {
        self.random = random;
        self
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn results(&self) -> &Arc<dyn ResultStore> {
        self.sink.store()
    }

    /// Validates a trigger request and creates its run. The run is not driven.
    pub async fn start(&self, request: &TriggerRequest) -> Result<TriggerAck, WorkflowError> {
        let number_of_items = request.validate(self.config.max_items)?;
        let run_id = self.create_run(number_of_items).await?;
        Ok(TriggerAck {
            message: format!("run accepted for {} items", number_of_items),
            run_id,
        })
    }

    /// Records a new run in history
    pub async fn create_run(&self, number_of_items: usize) -> Result<RunId, WorkflowError> {
        self.config.validate()?;
        if number_of_items > self.config.max_items {
            return Err(WorkflowError::Validation(format!(
                "numberOfItems {} exceeds the maximum of {}",
                number_of_items, self.config.max_items
            )));
        }

        let run_id = RunId::generate();
        let record = StepRecord::RunCreated {
            number_of_items,
            parallelism: self.config.parallelism,
            created_at: Utc::now(),
        };
        self.history
            .append(HistoryEvent::new(run_id.clone(), 0, record))
            .await?;

        tracing::info!(
            run_id = %run_id,
            number_of_items,
            parallelism = self.config.parallelism,
            "run created"
        );
        Ok(run_id)
    }

    /// Creates a run and drives it to a terminal phase
    pub async fn execute(&self, request: &TriggerRequest) -> Result<RunStatus, WorkflowError> {
        let ack = self.start(request).await?;
        self.run(&ack.run_id).await
    }

    /// Drives a run from its persisted history until it completes, fails or is cancelled.
    ///
    /// Steps already recorded are not executed again. A run that is already
    /// terminal is returned as is. A failure recorded during this call is
    /// returned as an error; the run's status then reports `Failed`.
    pub async fn run(&self, run_id: &RunId) -> Result<RunStatus, WorkflowError> {
        let events = self.history.read(run_id).await?;
        let mut state = RunState::replay(run_id, &events)?;
        tracing::info!(
            run_id = %run_id,
            replaying = true,
            events = events.len(),
            phase = %state.phase(),
            "replayed history"
        );

        loop {
            let step = state.next_step();
            if step == NextStep::Finished {
                tracing::info!(run_id = %run_id, phase = %state.phase(), "run finished");
                return Ok(state.status());
            }

            if self.cancellation_token.is_cancelled() {
                tracing::warn!(run_id = %run_id, phase = %state.phase(), "run cancelled");
                return Err(WorkflowError::Cancelled {
                    run_id: run_id.clone(),
                    phase: state.phase(),
                });
            }

            match step {
                NextStep::Generate => self.generate(&mut state).await?,
                NextStep::Partition => self.partition(&mut state).await?,
                NextStep::SortChunks(pending) => self.sort_chunks(&mut state, pending).await?,
                NextStep::Merge => self.merge(&mut state).await?,
                NextStep::Store => self.store(&mut state).await?,
                NextStep::Complete => {
                    self.append(&mut state, StepRecord::RunCompleted).await?;
                }
                NextStep::Finished => {}
            }
        }
    }

    /// Current phase, and the result once completed
    pub async fn status(&self, run_id: &RunId) -> Result<RunStatus, WorkflowError> {
        let events = self.history.read(run_id).await?;
        Ok(RunState::replay(run_id, &events)?.status())
    }

    pub async fn list_runs(&self) -> Result<Vec<RunStatus>, WorkflowError> {
        let mut statuses = Vec::new();
        for run_id in self.history.list_runs().await? {
            statuses.push(self.status(&run_id).await?);
        }
        Ok(statuses)
    }

    async fn append(&self, state: &mut RunState, record: StepRecord) -> Result<(), WorkflowError> {
        let event = HistoryEvent::new(state.run_id().clone(), state.next_sequence(), record);
        self.history.append(event.clone()).await?;
        tracing::debug!(
            run_id = %state.run_id(),
            sequence = event.sequence,
            step = event.step_name(),
            "recorded step"
        );
        state.apply(&event)
    }

    /// Appends a phase marker unless a previous attempt already entered the phase
    async fn enter(
        &self,
        state: &mut RunState,
        phase: Phase,
        marker: StepRecord,
    ) -> Result<(), WorkflowError> {
        if state.phase() == phase {
            return Ok(());
        }
        tracing::info!(run_id = %state.run_id(), phase = %phase, "entering phase");
        self.append(state, marker).await
    }

    async fn fail(
        &self,
        state: &mut RunState,
        step: &str,
        attempts: u32,
        reason: String,
    ) -> Result<WorkflowError, WorkflowError> {
        let phase = state.phase();
        self.fail_at(state, phase, step, attempts, reason).await
    }

    /// Records the failure against `phase` rather than the last phase entered
    async fn fail_at(
        &self,
        state: &mut RunState,
        phase: Phase,
        step: &str,
        attempts: u32,
        reason: String,
    ) -> Result<WorkflowError, WorkflowError> {
        tracing::error!(
            run_id = %state.run_id(),
            phase = %phase,
            step,
            attempts,
            reason = %reason,
            "run failed"
        );
        self.append(
            state,
            StepRecord::RunFailed {
                phase,
                step: step.to_string(),
                reason: reason.clone(),
            },
        )
        .await?;

        Ok(WorkflowError::StepFailed {
            run_id: state.run_id().clone(),
            phase,
            step: step.to_string(),
            attempts,
            reason,
        })
    }

    async fn fail_retry(&self, state: &mut RunState, error: RetryError) -> WorkflowError {
        let step = match &error {
            RetryError::Cancelled { .. } => {
                return WorkflowError::Cancelled {
                    run_id: state.run_id().clone(),
                    phase: state.phase(),
                };
            }
            RetryError::Exhausted { step, .. } | RetryError::Fatal { step, .. } => step.clone(),
        };
        match self.fail(state, &step, error.attempts(), error.reason()).await {
            Ok(failed) | Err(failed) => failed,
        }
    }

    async fn generate(&self, state: &mut RunState) -> Result<(), WorkflowError> {
        self.enter(state, Phase::Generating, StepRecord::GenerationStarted)
            .await?;

        let count = state.run().number_of_items;
        let generated = run_with_retry(
            "generate_items",
            &self.config.retry,
            self.timer.as_ref(),
            self.random.as_ref(),
            &self.cancellation_token,
            |_attempt| {
                let generator = self.generator.clone();
                async move {
                    let items = spawn_blocking(move || generator.generate(count))
                        .await
                        .map_err(|e| {
                            StepFailure::transient(format!("generator panicked: {:?}", e))
                        })??;
                    if items.len() != count {
                        return Err(StepFailure::fatal(format!(
                            "generator returned {} items, {} requested",
                            items.len(),
                            count
                        )));
                    }
                    Ok(items)
                }
            },
        )
        .await;

        match generated {
            Ok(items) => {
                tracing::info!(run_id = %state.run_id(), items = items.len(), "items generated");
                self.append(state, StepRecord::ItemsGenerated { items }).await
            }
            Err(e) => Err(self.fail_retry(state, e).await),
        }
    }

    async fn partition(&self, state: &mut RunState) -> Result<(), WorkflowError> {
        let items = state.items().map(<[String]>::to_vec).unwrap_or_default();
        let parallelism = state.run().parallelism;

        match partition(state.run_id().as_str(), items, parallelism) {
            Ok(chunks) => {
                tracing::info!(
                    run_id = %state.run_id(),
                    chunks = chunks.len(),
                    sizes = ?chunks.iter().map(Chunk::len).collect::<Vec<_>>(),
                    "input partitioned"
                );
                self.append(state, StepRecord::InputPartitioned { chunks })
                    .await
            }
            Err(e) => Err(self
                .fail_at(state, Phase::Partitioned, "partition_input", 1, e.to_string())
                .await?),
        }
    }

    async fn sort_chunks(
        &self,
        state: &mut RunState,
        pending: Vec<Chunk>,
    ) -> Result<(), WorkflowError> {
        let chunk_count = state.chunk_count().unwrap_or(0);
        self.enter(
            state,
            Phase::SortingFanOut,
            StepRecord::FanOutStarted { chunk_count },
        )
        .await?;

        if !pending.is_empty() {
            if let Some(stop) = self.dispatch_and_record(state, pending).await {
                return Err(match stop {
                    FanOutStop::Store(e) => e,
                    FanOutStop::Cancelled => WorkflowError::Cancelled {
                        run_id: state.run_id().clone(),
                        phase: state.phase(),
                    },
                    FanOutStop::Failed {
                        step,
                        attempts,
                        reason,
                    } => self.fail(state, &step, attempts, reason).await?,
                });
            }
        }

        let missing = state.pending_chunks();
        if !missing.is_empty() {
            let indices: Vec<usize> = missing.iter().map(|c| c.index).collect();
            return Err(self
                .fail(
                    state,
                    "sort_chunks",
                    0,
                    format!("chunks {:?} have no sort result", indices),
                )
                .await?);
        }

        tracing::info!(run_id = %state.run_id(), chunks = chunk_count, "all chunks sorted");
        self.append(state, StepRecord::FanOutCompleted).await
    }

    /// Runs one fan-out round and records each result as it arrives.
    /// Always waits for every task before returning.
    async fn dispatch_and_record(
        &self,
        state: &mut RunState,
        pending: Vec<Chunk>,
    ) -> Option<FanOutStop> {
        let expected: Vec<(usize, usize)> = pending.iter().map(|c| (c.index, c.len())).collect();
        tracing::info!(
            run_id = %state.run_id(),
            tasks = pending.len(),
            "dispatching sort tasks"
        );

        let fan_out = SortFanOut::new(
            self.worker.clone(),
            self.timer.clone(),
            self.random.clone(),
            self.config.retry.clone(),
            self.cancellation_token.clone(),
            self.config.completion_channel_capacity,
        );
        let mut handle = fan_out.dispatch(pending);
        let mut reported = 0;
        let mut stop: Option<FanOutStop> = None;

        while let Some(outcome) = handle.next_completion().await {
            reported += 1;
            if stop.is_some() {
                continue;
            }

            let sorted = match outcome.result {
                Ok(sorted) => sorted,
                Err(RetryError::Cancelled { .. }) => {
                    handle.abort();
                    stop = Some(FanOutStop::Cancelled);
                    continue;
                }
                Err(e) => {
                    handle.abort();
                    stop = Some(FanOutStop::Failed {
                        step: format!("sort_chunk[{}]", outcome.index),
                        attempts: e.attempts(),
                        reason: e.reason(),
                    });
                    continue;
                }
            };

            let expected_len = expected
                .iter()
                .find(|(index, _)| *index == outcome.index)
                .map(|(_, len)| *len);
            if sorted.index != outcome.index || Some(sorted.items.len()) != expected_len {
                handle.abort();
                stop = Some(FanOutStop::Failed {
                    step: format!("sort_chunk[{}]", outcome.index),
                    attempts: 1,
                    reason: "worker returned a result for a different chunk".to_string(),
                });
                continue;
            }

            if state.is_chunk_sorted(sorted.index) {
                tracing::debug!(
                    run_id = %state.run_id(),
                    chunk = sorted.index,
                    "duplicate chunk result ignored"
                );
                continue;
            }

            tracing::debug!(run_id = %state.run_id(), chunk = sorted.index, "chunk sorted");
            if let Err(e) = self
                .append(state, StepRecord::ChunkSorted { chunk: sorted })
                .await
            {
                handle.abort();
                stop = Some(FanOutStop::Store(e));
            }
        }

        handle.join().await;

        if stop.is_none() && reported < expected.len() {
            stop = Some(FanOutStop::Failed {
                step: "sort_chunks".to_string(),
                attempts: 0,
                reason: format!(
                    "{} of {} sort tasks exited without reporting",
                    expected.len() - reported,
                    expected.len()
                ),
            });
        }

        if let Some(FanOutStop::Cancelled) = stop {
            if !self.cancellation_token.is_cancelled() {
                // Only an aborted round cancels its own tasks
                return Some(FanOutStop::Failed {
                    step: "sort_chunks".to_string(),
                    attempts: 0,
                    reason: "sort tasks cancelled".to_string(),
                });
            }
        }
        stop
    }

    async fn merge(&self, state: &mut RunState) -> Result<(), WorkflowError> {
        self.enter(state, Phase::Merging, StepRecord::MergeStarted)
            .await?;

        let expected = state.chunk_count().unwrap_or(0);
        match merge_sorted_chunks(state.sorted_chunks(), expected) {
            Ok(result) => {
                tracing::info!(run_id = %state.run_id(), items = result.len(), "chunks merged");
                self.append(state, StepRecord::ChunksMerged { result })
                    .await
            }
            Err(AlgorithmError::IncompleteInput { missing, .. }) => {
                self.fail(
                    state,
                    "merge_chunks",
                    1,
                    format!("incomplete input, missing chunks {:?}", missing),
                )
                .await?;
                Err(WorkflowError::IncompleteInput {
                    run_id: state.run_id().clone(),
                    missing,
                })
            }
            Err(e) => Err(self.fail(state, "merge_chunks", 1, e.to_string()).await?),
        }
    }

    async fn store(&self, state: &mut RunState) -> Result<(), WorkflowError> {
        self.enter(state, Phase::Storing, StepRecord::StoreStarted)
            .await?;

        let result = state.result().cloned().unwrap_or_default();
        let run_id = state.run_id().clone();
        let stored = run_with_retry(
            "store_result",
            &self.config.retry,
            self.timer.as_ref(),
            self.random.as_ref(),
            &self.cancellation_token,
            |_attempt| self.sink.persist(&run_id, &result),
        )
        .await;

        match stored {
            Ok(record_count) => {
                tracing::info!(run_id = %run_id, records = record_count, "result stored");
                self.append(state, StepRecord::ResultStored { record_count })
                    .await
            }
            Err(e) => Err(self.fail_retry(state, e).await),
        }
    }
}
