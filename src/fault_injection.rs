//! Latency and drop engine applied to every inbound command.
//!
//! The injector owns an explicit RNG seeded either from entropy or from a
//! caller-supplied seed, so tests can force deterministic outcomes without
//! statistical sampling. Delay and drop decisions are independent of command
//! content and of each other.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimConfig;

#[derive(Debug)]
pub struct FaultInjector {
    latency_s: f64,
    jitter_s: f64,
    drop_rate: f64,
    rng: StdRng,
}

impl FaultInjector {
    pub fn new(config: &SimConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic injector for tests and reproducible runs.
    pub fn with_seed(config: &SimConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &SimConfig, rng: StdRng) -> Self {
        Self {
            latency_s: config.latency_s(),
            jitter_s: config.jitter_s(),
            drop_rate: config.drop_rate(),
            rng,
        }
    }

    /// True with probability `drop_rate`, independently per invocation.
    ///
    /// Callers must check this before incurring [`Self::delay`]: a dropped
    /// command performs no wait and no publish.
    pub fn should_drop(&mut self) -> bool {
        self.drop_rate > 0.0 && self.rng.gen_bool(self.drop_rate)
    }

    /// Simulated processing latency: `base + uniform(0, jitter)`.
    pub fn delay(&mut self) -> Duration {
        let jitter = if self.jitter_s > 0.0 {
            self.rng.gen_range(0.0..self.jitter_s)
        } else {
            0.0
        };
        Duration::from_secs_f64(self.latency_s + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_rate_one_always_drops() {
        let config = SimConfig::new(0.0, 0.0, 1.0, false);
        let mut injector = FaultInjector::with_seed(&config, 7);
        for _ in 0..100 {
            assert!(injector.should_drop());
        }
    }

    #[test]
    fn test_drop_rate_zero_never_drops() {
        let config = SimConfig::new(0.0, 0.0, 0.0, false);
        let mut injector = FaultInjector::with_seed(&config, 7);
        for _ in 0..100 {
            assert!(!injector.should_drop());
        }
    }

    #[test]
    fn test_delay_without_jitter_is_exactly_base() {
        let config = SimConfig::new(1.5, 0.0, 0.0, false);
        let mut injector = FaultInjector::with_seed(&config, 7);
        assert_eq!(injector.delay(), Duration::from_secs_f64(1.5));
    }

    #[test]
    fn test_delay_stays_within_jitter_bounds() {
        let config = SimConfig::new(0.5, 0.25, 0.0, false);
        let mut injector = FaultInjector::with_seed(&config, 7);
        for _ in 0..1000 {
            let delay = injector.delay();
            assert!(delay >= Duration::from_secs_f64(0.5));
            assert!(delay <= Duration::from_secs_f64(0.75));
        }
    }

    #[test]
    fn test_zero_config_yields_zero_delay() {
        let config = SimConfig::new(0.0, 0.0, 0.0, false);
        let mut injector = FaultInjector::with_seed(&config, 7);
        assert!(injector.delay().is_zero());
    }

    #[test]
    fn test_same_seed_same_decisions() {
        let config = SimConfig::new(0.0, 1.0, 0.5, false);
        let mut a = FaultInjector::with_seed(&config, 42);
        let mut b = FaultInjector::with_seed(&config, 42);
        for _ in 0..50 {
            assert_eq!(a.should_drop(), b.should_drop());
            assert_eq!(a.delay(), b.delay());
        }
    }
}
