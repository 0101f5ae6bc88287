use std::fmt;
use std::time::Duration;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SimTime
// ---------------------------------------------------------------------------

/// Integer-nanosecond locomotion clock with a tick counter.
///
/// Elapsed time is kept as a `u64` nanosecond count so long runs do not
/// accumulate floating-point drift.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Resource,
)]
pub struct SimTime {
    nanos: u64,
    ticks: u64,
}

impl SimTime {
    #[must_use]
    pub const fn new() -> Self {
        Self { nanos: 0, ticks: 0 }
    }

    /// Raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Number of ticks recorded.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Elapsed seconds as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    #[must_use]
    pub const fn to_duration(&self) -> Duration {
        Duration::from_nanos(self.nanos)
    }

    /// Record one tick of `dt_secs` seconds. Negative or NaN deltas count as zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tick(&mut self, dt_secs: f64) {
        let delta = if dt_secs.is_finite() && dt_secs > 0.0 {
            (dt_secs * 1_000_000_000.0).round() as u64
        } else {
            0
        };
        self.nanos = self.nanos.saturating_add(delta);
        self.ticks = self.ticks.saturating_add(1);
    }

    pub const fn reset(&mut self) {
        self.nanos = 0;
        self.ticks = 0;
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.nanos / 1_000_000_000;
        let millis = (self.nanos % 1_000_000_000) / 1_000_000;
        write!(f, "{secs}.{millis:03}s (tick {})", self.ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_at_zero() {
        let t = SimTime::new();
        assert_eq!(t.nanos(), 0);
        assert_eq!(t.ticks(), 0);
    }

    #[test]
    fn tick_accumulates_without_drift() {
        let mut t = SimTime::new();
        for _ in 0..50_000 {
            t.tick(0.02);
        }
        assert_eq!(t.ticks(), 50_000);
        assert_eq!(t.nanos(), 1_000_000_000_000);
        assert_relative_eq!(t.secs_f64(), 1000.0);
    }

    #[test]
    fn bad_delta_counts_tick_only() {
        let mut t = SimTime::new();
        t.tick(-1.0);
        t.tick(f64::NAN);
        assert_eq!(t.ticks(), 2);
        assert_eq!(t.nanos(), 0);
    }

    #[test]
    fn reset_clears() {
        let mut t = SimTime::new();
        t.tick(0.5);
        t.reset();
        assert_eq!(t, SimTime::new());
    }

    #[test]
    fn display_format() {
        let mut t = SimTime::new();
        t.tick(1.25);
        assert_eq!(t.to_string(), "1.250s (tick 1)");
        assert_eq!(t.to_duration(), Duration::from_millis(1250));
    }
}
