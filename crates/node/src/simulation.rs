//! Artificial network delay for single-host testbeds.
//!
//! When every node runs on one machine, real RTTs are all near zero and the
//! coordinates have nothing to learn. A normally-distributed delay added
//! before each outbound call gives them something to converge on.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use std::time::Duration;

use coordinet_common::CoordinetError;

/// Normal(mean, stddev) delay in milliseconds, clamped at zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct NetworkDelay {
    #[serde(default)]
    pub delay_mean_ms: f64,
    #[serde(default)]
    pub delay_stddev_ms: f64,
}

impl NetworkDelay {
    pub fn new(mean_ms: f64, stddev_ms: f64) -> Self {
        Self {
            delay_mean_ms: mean_ms,
            delay_stddev_ms: stddev_ms,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.delay_mean_ms > 0.0 || self.delay_stddev_ms > 0.0
    }

    fn distribution(&self) -> Result<Normal<f64>, CoordinetError> {
        Normal::new(self.delay_mean_ms, self.delay_stddev_ms)
            .map_err(|e| CoordinetError::Config(format!("simulation delay: {e}")))
    }

    /// Reject parameters that cannot produce a sleepable delay
    pub fn validate(&self) -> Result<(), CoordinetError> {
        for (name, value) in [
            ("delay_mean_ms", self.delay_mean_ms),
            ("delay_stddev_ms", self.delay_stddev_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoordinetError::Config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
            if Duration::try_from_secs_f64(value / 1000.0).is_err() {
                return Err(CoordinetError::Config(format!("{name} is too large: {value}")));
            }
        }
        self.distribution().map(|_| ())
    }

    /// Draw one delay. Parameters that fail `validate` draw zero.
    pub fn sample_ms<G: Rng + ?Sized>(&self, rng: &mut G) -> f64 {
        if !self.is_enabled() {
            return 0.0;
        }
        match self.distribution() {
            Ok(normal) => normal.sample(rng).max(0.0),
            Err(_) => 0.0,
        }
    }

    /// Sleep for one sampled delay
    pub async fn wait(&self) {
        if !self.is_enabled() {
            return;
        }
        let ms = {
            let mut rng = rand::rng();
            self.sample_ms(&mut rng)
        };
        match Duration::try_from_secs_f64(ms / 1000.0) {
            Ok(delay) => tokio::time::sleep(delay).await,
            Err(e) => {
                tracing::warn!(delay_ms = ms, error = %e, "Simulated delay out of range, skipped")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_disabled_by_default() {
        let delay = NetworkDelay::default();
        assert!(!delay.is_enabled());
        assert!(delay.validate().is_ok());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(delay.sample_ms(&mut rng), 0.0);
    }

    #[test]
    fn test_samples_are_non_negative_and_centered() {
        let delay = NetworkDelay::new(100.0, 20.0);
        let mut rng = StdRng::seed_from_u64(42);

        let samples: Vec<f64> = (0..5_000).map(|_| delay.sample_ms(&mut rng)).collect();
        assert!(samples.iter().all(|&s| s >= 0.0 && s.is_finite()));

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((mean - 100.0).abs() < 3.0, "mean = {mean}");
    }

    #[test]
    fn test_clamped_at_zero() {
        let delay = NetworkDelay::new(0.0, 50.0);
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..1_000).all(|_| delay.sample_ms(&mut rng) >= 0.0));
    }

    #[test]
    fn test_zero_stddev_is_constant() {
        let delay = NetworkDelay::new(40.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(delay.sample_ms(&mut rng), 40.0);
    }

    #[test]
    fn test_validate_rejects_unusable_parameters() {
        for delay in [
            NetworkDelay::new(f64::INFINITY, 0.0),
            NetworkDelay::new(f64::NAN, 10.0),
            NetworkDelay::new(100.0, f64::INFINITY),
            NetworkDelay::new(100.0, -1.0),
            NetworkDelay::new(-5.0, 0.0),
            NetworkDelay::new(1e300, 0.0),
        ] {
            assert!(
                matches!(delay.validate(), Err(CoordinetError::Config(_))),
                "{delay:?} should be rejected"
            );
        }
        assert!(NetworkDelay::new(100.0, 20.0).validate().is_ok());
    }

    #[tokio::test]
    async fn test_wait_disabled_returns_immediately() {
        let start = std::time::Instant::now();
        NetworkDelay::default().wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_wait_out_of_range_is_skipped() {
        let start = std::time::Instant::now();
        NetworkDelay::new(1e300, 0.0).wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
