use std::path::PathBuf;

/// Simulation knobs, read-only for the process lifetime.
///
/// Out-of-range values are normalized at construction: latency and jitter
/// are floored at zero, the drop rate is clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    latency_s: f64,
    jitter_s: f64,
    drop_rate: f64,
    motor_fail: bool,
}

impl SimConfig {
    pub fn new(latency_s: f64, jitter_s: f64, drop_rate: f64, motor_fail: bool) -> Self {
        Self {
            latency_s: latency_s.max(0.0),
            jitter_s: jitter_s.max(0.0),
            drop_rate: drop_rate.clamp(0.0, 1.0),
            motor_fail,
        }
    }

    /// Base processing latency in seconds, applied before every reply.
    pub fn latency_s(&self) -> f64 {
        self.latency_s
    }

    /// Upper bound of the uniform extra delay in seconds.
    pub fn jitter_s(&self) -> f64 {
        self.jitter_s
    }

    /// Probability of silently dropping a reply, in `[0, 1]`.
    pub fn drop_rate(&self) -> f64 {
        self.drop_rate
    }

    /// When set, `START_MOTOR` commands are answered with an error.
    pub fn motor_fail(&self) -> bool {
        self.motor_fail
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, false)
    }
}

/// Broker session parameters consumed by [`crate::broker::connect`].
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub farm_id: String,
    pub username: String,
    pub password: String,
    /// Optional CA bundle (PEM). When absent the platform trust store is used.
    pub cafile: Option<PathBuf>,
    /// Optional client identifier; a `device_sim_<n>` id is generated otherwise.
    pub client_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_rate_clamped_to_unit_interval() {
        assert_eq!(SimConfig::new(1.0, 0.0, 1.7, false).drop_rate(), 1.0);
        assert_eq!(SimConfig::new(1.0, 0.0, -0.3, false).drop_rate(), 0.0);
        assert_eq!(SimConfig::new(1.0, 0.0, 0.25, false).drop_rate(), 0.25);
    }

    #[test]
    fn test_negative_timings_floored_at_zero() {
        let config = SimConfig::new(-2.0, -1.0, 0.0, false);
        assert_eq!(config.latency_s(), 0.0);
        assert_eq!(config.jitter_s(), 0.0);
    }
}
