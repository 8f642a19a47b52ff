use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Closed interval the perturbation delta is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseRange {
    low: i64,
    high: i64,
}

impl NoiseRange {
    /// `[-magnitude, +magnitude]`, inclusive both ends.
    pub const fn symmetric(magnitude: u32) -> Self {
        Self {
            low: -(magnitude as i64),
            high: magnitude as i64,
        }
    }

    pub fn low(&self) -> i64 {
        self.low
    }

    pub fn high(&self) -> i64 {
        self.high
    }

    pub fn contains(&self, delta: i64) -> bool {
        self.low <= delta && delta <= self.high
    }
}

impl Default for NoiseRange {
    fn default() -> Self {
        Self::symmetric(5)
    }
}

// Weyl increment mixed into the seed so statements started within one clock
// tick still diverge.
static STATEMENT_SALT: AtomicU64 = AtomicU64::new(0);

/// Per-statement perturbation source. Created at loop entry, discarded at
/// exit; never shared across statements.
pub struct Perturber {
    rng: StdRng,
    range: NoiseRange,
}

impl Perturber {
    /// Fresh generator for one statement execution.
    pub fn for_statement(range: NoiseRange) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let salt = STATEMENT_SALT.fetch_add(1, Ordering::Relaxed);

        Self::with_seed(
            nanos.wrapping_add(salt.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
            range,
        )
    }

    /// Deterministic generator, for tests and reproduction.
    pub fn with_seed(seed: u64, range: NoiseRange) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            range,
        }
    }

    pub fn range(&self) -> NoiseRange {
        self.range
    }

    /// Uniform draw over the configured interval, inclusive both ends.
    pub fn delta(&mut self) -> i64 {
        self.rng.gen_range(self.range.low..=self.range.high)
    }

    /// `value + delta`, wrapping so the corrupt path can never fail.
    pub fn perturb(&mut self, value: i64) -> i64 {
        value.wrapping_add(self.delta())
    }
}
