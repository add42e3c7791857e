#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-based difficulty curve shared by spawn cadence and enemy toughness.
//!
//! A single step clock drives two slopes: [`DifficultyCurve::scale`] grows by
//! `rate_increase` per interval and [`DifficultyCurve::stat_factor`] rides the
//! same steps at `stat_increase` per interval.

use std::time::Duration;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

/// Tuning of the step function applied to elapsed session time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCurve {
    /// When `false`, both factors stay at `1.0`.
    pub enabled: bool,
    /// Length of one difficulty step.
    #[serde(rename = "interval_ms", with = "arena_horde_core::millis")]
    pub interval: Duration,
    /// Ceiling of the rate factor; configuration files must keep it at or above `1.0`.
    #[serde(deserialize_with = "scaling_ceiling")]
    pub max_scaling: f64,
    /// Rate factor added per completed interval.
    pub rate_increase: f64,
    /// Stat factor added per completed interval.
    pub stat_increase: f64,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_millis(60_000),
            max_scaling: 3.0,
            rate_increase: 0.05,
            stat_increase: 0.03,
        }
    }
}

impl DifficultyCurve {
    /// Number of whole intervals contained in `elapsed`.
    #[must_use]
    pub fn steps(&self, elapsed: Duration) -> u64 {
        let interval = self.interval.as_millis();
        if interval == 0 {
            return 0;
        }
        u64::try_from(elapsed.as_millis() / interval).unwrap_or(u64::MAX)
    }

    /// Spawn-rate factor: `min(max_scaling, 1 + steps * rate_increase)`.
    #[must_use]
    pub fn scale(&self, elapsed: Duration) -> f64 {
        if !self.enabled {
            return 1.0;
        }
        let raw = 1.0 + self.steps(elapsed) as f64 * self.rate_increase;
        raw.min(self.max_scaling)
    }

    /// Enemy-stat factor riding the same steps as [`DifficultyCurve::scale`].
    #[must_use]
    pub fn stat_factor(&self, elapsed: Duration) -> f64 {
        let scale = self.scale(elapsed);
        if self.rate_increase == 0.0 {
            return 1.0;
        }
        1.0 + (scale - 1.0) * (self.stat_increase / self.rate_increase)
    }

    /// Spawn-count factor, applying half of the rate growth.
    #[must_use]
    pub fn count_factor(&self, elapsed: Duration) -> f64 {
        1.0 + (self.scale(elapsed) - 1.0) * 0.5
    }
}

fn scaling_ceiling<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let ceiling = f64::deserialize(deserializer)?;
    if ceiling.is_finite() && ceiling >= 1.0 {
        Ok(ceiling)
    } else {
        Err(D::Error::custom(format!(
            "max_scaling must be a finite value of at least 1.0, got {ceiling}"
        )))
    }
}
