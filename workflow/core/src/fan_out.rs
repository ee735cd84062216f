// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{run_with_retry, Random, RetryError, RetryPolicy, SortWorker, Timer};
use merge_sort_core::{Chunk, SortedChunk};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Final result of one chunk's sort task, after its own retries
#[derive(Debug)]
pub struct ChunkOutcome {
    pub index: usize,
    pub result: Result<SortedChunk, RetryError>,
}

/// Dispatches one sort task per chunk. Tasks share no state and report
/// back over a completion channel in whatever order they finish.
pub struct SortFanOut {
    worker: Arc<dyn SortWorker>,
    timer: Arc<dyn Timer>,
    random: Arc<dyn Random>,
    policy: RetryPolicy,
    cancellation_token: CancellationToken,
    channel_capacity: usize,
}

impl SortFanOut {
    pub fn new(
        worker: Arc<dyn SortWorker>,
        timer: Arc<dyn Timer>,
        random: Arc<dyn Random>,
        policy: RetryPolicy,
        cancellation_token: CancellationToken,
        channel_capacity: usize,
    ) -> Self {
        Self {
            worker,
            timer,
            random,
            policy,
            cancellation_token,
            channel_capacity,
        }
    }

    /// Spawns a task per chunk and returns immediately
    pub fn dispatch(&self, chunks: Vec<Chunk>) -> FanOutHandle {
        let (complete_tx, complete_rx) =
            mpsc::channel::<ChunkOutcome>(self.channel_capacity.max(1));
        let token = self.cancellation_token.child_token();
        let active = chunks.len();

        let handles = chunks
            .into_iter()
            .map(|chunk| {
                let worker = self.worker.clone();
                let timer = self.timer.clone();
                let random = self.random.clone();
                let policy = self.policy.clone();
                let token = token.clone();
                let tx = complete_tx.clone();

                tokio::spawn(async move {
                    let index = chunk.index;
                    let step = format!("sort_chunk[{}]", index);
                    let result = run_with_retry(
                        &step,
                        &policy,
                        timer.as_ref(),
                        random.as_ref(),
                        &token,
                        |_attempt| {
                            let worker = worker.clone();
                            let chunk = chunk.clone();
                            async move { worker.sort(chunk).await }
                        },
                    )
                    .await;

                    if tx.send(ChunkOutcome { index, result }).await.is_err() {
                        tracing::debug!(chunk = index, "fan-out receiver dropped");
                    }
                })
            })
            .collect();

        FanOutHandle {
            complete_rx,
            handles,
            active,
            token,
        }
    }
}

/// Join side of a dispatched fan-out
pub struct FanOutHandle {
    complete_rx: mpsc::Receiver<ChunkOutcome>,
    handles: Vec<JoinHandle<()>>,
    active: usize,
    token: CancellationToken,
}

impl FanOutHandle {
    /// Next finished chunk, or `None` once every task has reported or exited
    pub async fn next_completion(&mut self) -> Option<ChunkOutcome> {
        if self.active == 0 {
            return None;
        }
        let outcome = self.complete_rx.recv().await;
        if outcome.is_some() {
            self.active -= 1;
        }
        outcome
    }

    /// Stops retries of the tasks still running; each still reports an outcome
    pub fn abort(&self) {
        self.token.cancel();
    }

    /// Join barrier: waits for every spawned task to exit
    pub async fn join(self) {
        for (idx, handle) in self.handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!(task = idx, error = %e, "sort task failed to join");
            }
        }
    }
}
