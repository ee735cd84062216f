// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Random, StepFailure, Timer};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Bounded attempts with exponential backoff, applied per unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
    pub jitter_ratio: f64,
    pub step_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 100,
            backoff_multiplier: 2.0,
            max_backoff_ms: 5_000,
            jitter_ratio: 0.1,
            step_timeout_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based), before jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let millis = (self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(exponent))
            .min(self.max_backoff_ms as f64);
        Duration::from_millis(millis as u64)
    }

    pub fn jittered_backoff(&self, attempt: u32, random: &dyn Random) -> Duration {
        let base = self.backoff(attempt).as_millis() as f64;
        let spread = base * self.jitter_ratio * (2.0 * f64::from(random.f32()) - 1.0);
        Duration::from_millis((base + spread).max(0.0) as u64)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("step '{step}' gave up after {attempts} attempts: {last}")]
    Exhausted {
        step: String,
        attempts: u32,
        last: StepFailure,
    },

    #[error("step '{step}' failed permanently on attempt {attempts}: {failure}")]
    Fatal {
        step: String,
        attempts: u32,
        failure: StepFailure,
    },

    #[error("step '{step}' cancelled")]
    Cancelled { step: String },
}

impl RetryError {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } | RetryError::Fatal { attempts, .. } => {
                *attempts
            }
            RetryError::Cancelled { .. } => 0,
        }
    }

    pub fn reason(&self) -> String {
        match self {
            RetryError::Exhausted { last, .. } => last.message.clone(),
            RetryError::Fatal { failure, .. } => failure.message.clone(),
            RetryError::Cancelled { .. } => "cancelled".to_string(),
        }
    }
}

/// Runs `attempt` until it succeeds, fails fatally, exhausts `policy.max_attempts`
/// or the token is cancelled. Each attempt is bounded by `policy.step_timeout()`;
/// a timeout counts as a transient failure.
pub async fn run_with_retry<T, F, Fut>(
    step: &str,
    policy: &RetryPolicy,
    timer: &dyn Timer,
    random: &dyn Random,
    cancellation_token: &CancellationToken,
    mut attempt: F,
) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, StepFailure>>,
{
    let mut attempt_number: u32 = 0;

    loop {
        if cancellation_token.is_cancelled() {
            return Err(RetryError::Cancelled {
                step: step.to_string(),
            });
        }

        attempt_number += 1;
        let outcome = match tokio::time::timeout(policy.step_timeout(), attempt(attempt_number))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(StepFailure::transient(format!(
                "attempt timed out after {:?}",
                policy.step_timeout()
            ))),
        };

        let failure = match outcome {
            Ok(value) => {
                if attempt_number > 1 {
                    tracing::info!(step, attempts = attempt_number, "step recovered");
                }
                return Ok(value);
            }
            Err(failure) => failure,
        };

        if !failure.is_transient() {
            return Err(RetryError::Fatal {
                step: step.to_string(),
                attempts: attempt_number,
                failure,
            });
        }

        if attempt_number >= policy.max_attempts {
            tracing::warn!(step, attempts = attempt_number, error = %failure, "giving up");
            return Err(RetryError::Exhausted {
                step: step.to_string(),
                attempts: attempt_number,
                last: failure,
            });
        }

        let delay = policy.jittered_backoff(attempt_number, random);
        tracing::warn!(
            step,
            attempt = attempt_number,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %failure,
            "step failed, retrying"
        );

        tokio::select! {
            _ = cancellation_token.cancelled() => {
                return Err(RetryError::Cancelled { step: step.to_string() });
            }
            _ = timer.sleep(delay) => {}
        }
    }
}
