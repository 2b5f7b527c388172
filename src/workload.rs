//! Seeded random operation streams.
//!
//! Produces [`Operation`]s over a bounded key space (`k0`, `k1`, ...) with a
//! configurable put/get/remove mix. The same [`WorkloadConfig`] always yields
//! the same stream, so generated logs can be regenerated instead of stored.
//!
//! ```
//! use freqcache::workload::{OperationGenerator, WorkloadConfig};
//!
//! let config = WorkloadConfig { seed: 7, ..WorkloadConfig::default() };
//! let a = OperationGenerator::new(config).generate(100);
//! let b = OperationGenerator::new(config).generate(100);
//! assert_eq!(a, b);
//! ```

use rand::distr::Alphanumeric;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::oplog::Operation;

/// Relative weights of each operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationMix {
    pub put: u32,
    pub get: u32,
    pub remove: u32,
}

impl OperationMix {
    pub fn total(&self) -> u64 {
        u64::from(self.put) + u64::from(self.get) + u64::from(self.remove)
    }
}

impl Default for OperationMix {
    fn default() -> Self {
        Self {
            put: 5,
            get: 4,
            remove: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadConfig {
    pub seed: u64,
    /// Number of distinct keys.
    pub key_space: usize,
    /// Length of generated values.
    pub value_len: usize,
    pub mix: OperationMix,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            key_space: 64,
            value_len: 8,
            mix: OperationMix::default(),
        }
    }
}

/// Infinite iterator of random operations.
#[derive(Debug, Clone)]
pub struct OperationGenerator {
    key_space: usize,
    value_len: usize,
    mix: OperationMix,
    rng: SmallRng,
}

impl OperationGenerator {
    /// A zero key space or value length is raised to 1; an all-zero mix falls
    /// back to the default mix.
    pub fn new(config: WorkloadConfig) -> Self {
        let mix = if config.mix.total() == 0 {
            OperationMix::default()
        } else {
            config.mix
        };
        Self {
            key_space: config.key_space.max(1),
            value_len: config.value_len.max(1),
            mix,
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    pub fn next_op(&mut self) -> Operation {
        let roll = self.rng.random_range(0..self.mix.total());
        let key = format!("k{}", self.rng.random_range(0..self.key_space));

        if roll < u64::from(self.mix.put) {
            let value = self.next_value();
            Operation::Put { key, value }
        } else if roll < u64::from(self.mix.put) + u64::from(self.mix.get) {
            Operation::Get { key }
        } else {
            Operation::Remove { key }
        }
    }

    pub fn generate(&mut self, count: usize) -> Vec<Operation> {
        (0..count).map(|_| self.next_op()).collect()
    }

    // Roughly one value in four gets an inner space so logs exercise
    // multi-word values.
    fn next_value(&mut self) -> String {
        let mut value: String = (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(self.value_len)
            .map(char::from)
            .collect();
        if self.value_len >= 3 && self.rng.random_bool(0.25) {
            let at = self.rng.random_range(1..self.value_len - 1);
            value.replace_range(at..at + 1, " ");
        }
        value
    }
}

impl Iterator for OperationGenerator {
    type Item = Operation;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_op())
    }
}
