//! Injectable random source

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Decimal places of a unit draw
const UNIT_DP: u32 = 6;
const UNIT_SCALE: i64 = 1_000_000;

/// Source of uniform draws used by the price walk and tick synthesis
pub trait RandomSource: Send {
    /// Uniform draw in [0, 1]
    fn unit(&mut self) -> Decimal;

    /// Uniform draw in [-1, 1]
    fn signed_unit(&mut self) -> Decimal {
        self.unit() * Decimal::TWO - Decimal::ONE
    }

    /// Uniform draw in [lo, hi]; returns `lo` when the range is empty
    fn between(&mut self, lo: Decimal, hi: Decimal) -> Decimal {
        if hi <= lo {
            return lo;
        }
        (lo + (hi - lo) * self.unit()).min(hi)
    }
}

/// `StdRng`-backed source, reproducible when seeded
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic source for reproducible runs
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn unit(&mut self) -> Decimal {
        Decimal::new(self.rng.random_range(0..=UNIT_SCALE), UNIT_DP)
    }
}

/// Source that always returns the same unit draw
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub Decimal);

impl RandomSource for FixedRandom {
    fn unit(&mut self) -> Decimal {
        self.0.clamp(Decimal::ZERO, Decimal::ONE)
    }
}
