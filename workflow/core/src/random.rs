// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Source of backoff jitter
pub trait Random: Send + Sync {
    /// Uniform in [0, 1)
    fn f32(&self) -> f32;
}

pub struct FastrandRandom;

impl Random for FastrandRandom {
    fn f32(&self) -> f32 {
        fastrand::f32()
    }
}
