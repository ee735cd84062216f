// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use async_trait::async_trait;
use merge_sort_core::{sort_chunk, AlgorithmError, Chunk, DataGenerator, SortedChunk};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use workflow_core::{
    Random, ResultStore, RetryPolicy, SortWorker, StepFailure, StoreError, StoredRecord, Timer,
    WorkflowConfig,
};

/// Returns immediately and remembers every requested delay
#[derive(Default)]
pub struct InstantTimer {
    pub delays: Mutex<Vec<Duration>>,
}

impl InstantTimer {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Timer for InstantTimer {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub struct FixedRandom(pub f32);

impl Random for FixedRandom {
    fn f32(&self) -> f32 {
        self.0
    }
}

/// Hands out the first `count` items of a fixed list
pub struct FixedGenerator(pub Vec<String>);

impl FixedGenerator {
    pub fn from_strs(items: &[&str]) -> Self {
        Self(items.iter().map(|s| s.to_string()).collect())
    }
}

impl DataGenerator for FixedGenerator {
    fn generate(&self, count: usize) -> Result<Vec<String>, AlgorithmError> {
        if count > self.0.len() {
            return Err(AlgorithmError::GenerationFailed {
                requested: count,
                max: self.0.len(),
            });
        }
        Ok(self.0[..count].to_vec())
    }
}

/// Sorts correctly; counts calls per chunk index and fails the first
/// `failures[index]` calls for that index
#[derive(Default)]
pub struct ScriptedWorker {
    failures: HashMap<usize, u32>,
    fatal: bool,
    calls: Mutex<HashMap<usize, u32>>,
    total: AtomicUsize,
}

impl ScriptedWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(index: usize, times: u32) -> Self {
        let mut worker = Self::default();
        worker.failures.insert(index, times);
        worker
    }

    pub fn fatal(index: usize) -> Self {
        let mut worker = Self::failing(index, u32::MAX);
        worker.fatal = true;
        worker
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, index: usize) -> u32 {
        self.calls.lock().unwrap().get(&index).copied().unwrap_or(0)
    }
}

#[async_trait]
impl SortWorker for ScriptedWorker {
    async fn sort(&self, chunk: Chunk) -> Result<SortedChunk, StepFailure> {
        self.total.fetch_add(1, Ordering::SeqCst);
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let entry = calls.entry(chunk.index).or_insert(0);
            *entry += 1;
            *entry
        };

        let allowed_failures = self.failures.get(&chunk.index).copied().unwrap_or(0);
        if call <= allowed_failures {
            let message = format!("chunk {} call {} failed", chunk.index, call);
            return Err(if self.fatal {
                StepFailure::fatal(message)
            } else {
                StepFailure::transient(message)
            });
        }
        Ok(sort_chunk(chunk))
    }
}

/// Wraps another result store and fails the first `failures` bulk writes
pub struct FlakyResultStore<S> {
    pub inner: S,
    failures: AtomicUsize,
    pub writes: AtomicUsize,
}

impl<S> FlakyResultStore<S> {
    pub fn new(inner: S, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
            writes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<S: ResultStore> ResultStore for FlakyResultStore<S> {
    async fn upsert(&self, record: StoredRecord) -> Result<(), StoreError> {
        self.inner.upsert(record).await
    }

    async fn get(&self, partition_key: &str, row_key: &str) -> Result<StoredRecord, StoreError> {
        self.inner.get(partition_key, row_key).await
    }

    async fn scan(&self) -> Result<Vec<StoredRecord>, StoreError> {
        self.inner.scan().await
    }

    async fn upsert_all(&self, records: Vec<StoredRecord>) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            // Partial write before failing
            if let Some(first) = records.into_iter().next() {
                self.inner.upsert(first).await?;
            }
            return Err(StoreError::Internal("table unavailable".to_string()));
        }
        self.inner.upsert_all(records).await
    }
}

pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn fast_config(parallelism: usize) -> WorkflowConfig {
    WorkflowConfig {
        parallelism,
        max_items: 1_000,
        retry: RetryPolicy {
            max_attempts: 3,
            initial_backoff_ms: 10,
            backoff_multiplier: 2.0,
            max_backoff_ms: 1_000,
            jitter_ratio: 0.0,
            step_timeout_ms: 5_000,
        },
        completion_channel_capacity: 4,
    }
}
