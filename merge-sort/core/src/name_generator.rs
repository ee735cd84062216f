// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::AlgorithmError;
use rand::{rngs::StdRng, Rng, SeedableRng};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Amara", "Anton", "Beatriz", "Boris", "Camille", "Chidi", "Dmitri", "Elena",
    "Farah", "Felix", "Grace", "Hana", "Ines", "Ivan", "Jamal", "Keiko", "Lars", "Lucia",
    "Mateo", "Mei", "Nadia", "Omar", "Priya", "Rafael", "Sofia", "Tariq", "Uma", "Yusuf",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Bauer", "Castillo", "Dubois", "Eriksen", "Fischer", "Garcia", "Haddad", "Ito",
    "Jensen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov", "Quinn",
    "Rossi", "Schmidt", "Tanaka", "Usman", "Varga", "Weber", "Xu", "Yamada", "Zhou",
];

/// Produces the unsorted input of a run. Either returns exactly `count`
/// items or fails without a partial list.
pub trait DataGenerator: Send + Sync {
    fn generate(&self, count: usize) -> Result<Vec<String>, AlgorithmError>;
}

/// Random "First Last" display names
pub struct FakeNameGenerator {
    max_items: usize,
    seed: Option<u64>,
}

impl FakeNameGenerator {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            seed: None,
        }
    }

    /// Every call produces the same sequence for the same count
    pub fn with_seed(max_items: usize, seed: u64) -> Self {
        Self {
            max_items,
            seed: Some(seed),
        }
    }
}

impl DataGenerator for FakeNameGenerator {
    fn generate(&self, count: usize) -> Result<Vec<String>, AlgorithmError> {
        if count > self.max_items {
            return Err(AlgorithmError::GenerationFailed {
                requested: count,
                max: self.max_items,
            });
        }

        tracing::debug!(count, "generating fake names");
        let names = match self.seed {
            Some(seed) => generate_names(&mut StdRng::seed_from_u64(seed), count),
            None => generate_names(&mut rand::rng(), count),
        };
        Ok(names)
    }
}

pub fn generate_full_name(rng: &mut impl Rng) -> String {
    let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
    format!("{} {}", first, last)
}

pub fn generate_names(rng: &mut impl Rng, count: usize) -> Vec<String> {
    (0..count).map(|_| generate_full_name(rng)).collect()
}
