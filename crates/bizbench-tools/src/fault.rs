//! Seeded fault injection for simulated tool failures
//!
//! Error simulation is deterministic per benchmark invocation: the injector
//! is seeded from the benchmark configuration, so repeated invocations with
//! the same config reproduce the same failure sequence. The RNG sits behind
//! a lock because tool instances are shared across concurrent units.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides, per call, whether a tool answers with a simulated failure
#[derive(Debug)]
pub struct FaultInjector {
    error_rate: f64,
    rng: Mutex<StdRng>,
}

impl FaultInjector {
    /// Create an injector with the given error rate and seed.
    ///
    /// The rate is clamped into [0, 1].
    pub fn new(error_rate: f64, seed: u64) -> Self {
        Self {
            error_rate: error_rate.clamp(0.0, 1.0),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// An injector that never fails
    pub fn disabled() -> Self {
        Self::new(0.0, 0)
    }

    /// The configured error rate
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Decide whether the current call should fail
    pub fn should_fail(&self) -> bool {
        if self.error_rate <= 0.0 {
            return false;
        }
        if self.error_rate >= 1.0 {
            return true;
        }
        self.rng.lock().gen_range(0.0..1.0) < self.error_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_never_fails() {
        let injector = FaultInjector::new(0.0, 42);
        assert!((0..100).all(|_| !injector.should_fail()));
    }

    #[test]
    fn full_rate_always_fails() {
        let injector = FaultInjector::new(1.0, 42);
        assert!((0..100).all(|_| injector.should_fail()));
    }

    #[test]
    fn equal_seeds_reproduce_the_same_sequence() {
        let a = FaultInjector::new(0.5, 7);
        let b = FaultInjector::new(0.5, 7);
        let seq_a: Vec<bool> = (0..64).map(|_| a.should_fail()).collect();
        let seq_b: Vec<bool> = (0..64).map(|_| b.should_fail()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(FaultInjector::new(1.7, 0).error_rate(), 1.0);
        assert_eq!(FaultInjector::new(-0.3, 0).error_rate(), 0.0);
    }
}
