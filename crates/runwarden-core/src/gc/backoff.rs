use std::time::Duration;

use runwarden_config::GcConfig;

/// Capped exponential delay between GC attempts.
///
/// After the n-th failed attempt the task waits `base * 2^(n-1)`, never more
/// than `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    /// `max` below `base` is raised to `base`.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
        }
    }

    pub fn from_config(gc: &GcConfig) -> Self {
        Self::new(
            Duration::from_secs(gc.backoff_base_seconds),
            Duration::from_secs(gc.backoff_max_seconds),
        )
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Delay after `failed_attempts` failures; zero failures gets `base`.
    pub fn delay(&self, failed_attempts: u32) -> Duration {
        let exp = failed_attempts.saturating_sub(1).min(31);
        self.base
            .checked_mul(1u32 << exp)
            .map_or(self.max, |d| d.min(self.max))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&GcConfig::default())
    }
}
