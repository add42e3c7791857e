#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave state machine driven by elapsed simulation time.

use std::time::Duration;

use arena_horde_core::{WaveConfig, WaveTable};
use tracing::info;

/// Tracks the current wave and when it began.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveClock {
    current: u32,
    started_at: Duration,
}

impl Default for WaveClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveClock {
    /// Creates a clock on wave 1 that started at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: 1,
            started_at: Duration::ZERO,
        }
    }

    /// Returns to wave 1, anchored at `now`.
    pub fn restart(&mut self, now: Duration) {
        self.current = 1;
        self.started_at = now;
    }

    /// One-based index of the current wave.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Time at which the current wave began.
    #[must_use]
    pub const fn started_at(&self) -> Duration {
        self.started_at
    }

    /// Configuration governing the current wave.
    #[must_use]
    pub fn config<'a>(&self, table: &'a WaveTable) -> &'a WaveConfig {
        table.get(self.current)
    }

    /// Advances at most one wave when the current one has run its course.
    ///
    /// Returns the index of the wave that began, exactly once per increment.
    pub fn advance(&mut self, now: Duration, table: &WaveTable) -> Option<u32> {
        let elapsed = now.saturating_sub(self.started_at);
        if elapsed < self.config(table).duration {
            return None;
        }

        self.current = self.current.saturating_add(1);
        self.started_at = now;
        info!(
            wave = self.current,
            message = %self.config(table).message,
            "wave advanced"
        );
        Some(self.current)
    }
}
