//! Simulation clock management.
//!
//! Tracks simulated time with a fixed timestep. Time is stored as integer
//! nanoseconds so that repeated ticks do not accumulate rounding error.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Simulation time, in nanoseconds from session start (or last reset).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SimTime {
    nanos: u64,
}

impl SimTime {
    /// Zero time (simulation start).
    pub const ZERO: Self = Self { nanos: 0 };

    /// Create time from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Get time as seconds (f64).
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Get time as nanoseconds.
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.nanos
    }

    /// Add duration to time, saturating at `u64::MAX`.
    #[must_use]
    pub const fn add_nanos(self, nanos: u64) -> Self {
        Self {
            nanos: self.nanos.saturating_add(nanos),
        }
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// Fixed-timestep simulation clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    current: SimTime,
    timestep_nanos: u64,
    step_count: u64,
}

impl SimClock {
    /// Create a new clock with the given timestep in seconds.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the timestep is not positive and
    /// finite, or rounds to zero nanoseconds.
    pub fn new(timestep_secs: f64) -> SimResult<Self> {
        if !timestep_secs.is_finite() || timestep_secs <= 0.0 {
            return Err(SimError::config(format!(
                "Timestep must be positive and finite, got {timestep_secs}"
            )));
        }
        let timestep_nanos = (timestep_secs * 1_000_000_000.0).round() as u64;
        if timestep_nanos == 0 {
            return Err(SimError::config("Timestep is below clock resolution (1ns)"));
        }
        Ok(Self::from_nanos(timestep_nanos))
    }

    /// Create a new clock with timestep in nanoseconds.
    #[must_use]
    pub const fn from_nanos(timestep_nanos: u64) -> Self {
        Self {
            current: SimTime::ZERO,
            timestep_nanos,
            step_count: 0,
        }
    }

    /// Get current simulation time.
    #[must_use]
    pub const fn current_time(&self) -> SimTime {
        self.current
    }

    /// Timestep in seconds.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.timestep_nanos as f64 / 1_000_000_000.0
    }

    /// Get number of steps taken.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Advance clock by one timestep and return the new time.
    #[allow(clippy::missing_const_for_fn)] // Mutable const not stable
    pub fn tick(&mut self) -> SimTime {
        self.current = self.current.add_nanos(self.timestep_nanos);
        self.step_count += 1;
        self.current
    }

    /// Reset clock to zero.
    #[allow(clippy::missing_const_for_fn)] // Mutable const not stable
    pub fn reset(&mut self) {
        self.current = SimTime::ZERO;
        self.step_count = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_tick() {
        let mut clock = SimClock::new(0.016).unwrap();
        assert_eq!(clock.current_time(), SimTime::ZERO);

        for _ in 0..1000 {
            clock.tick();
        }
        assert_eq!(clock.step_count(), 1000);
        assert_eq!(clock.current_time().as_nanos(), 16_000_000_000);
        assert!((clock.current_time().as_secs_f64() - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clock_dt() {
        let clock = SimClock::new(0.016).unwrap();
        assert!((clock.dt() - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_clock_rejects_bad_timestep() {
        assert!(SimClock::new(0.0).is_err());
        assert!(SimClock::new(-0.1).is_err());
        assert!(SimClock::new(f64::NAN).is_err());
        assert!(SimClock::new(1e-12).is_err());
    }

    #[test]
    fn test_clock_reset() {
        let mut clock = SimClock::from_nanos(10);
        clock.tick();
        clock.tick();
        clock.reset();
        assert_eq!(clock.step_count(), 0);
        assert_eq!(clock.current_time(), SimTime::ZERO);
    }

    #[test]
    fn test_sim_time_display() {
        assert_eq!(SimTime::from_nanos(1_500_000_000).to_string(), "1.500s");
    }

    #[test]
    fn test_sim_time_saturates() {
        let t = SimTime::from_nanos(u64::MAX).add_nanos(5);
        assert_eq!(t.as_nanos(), u64::MAX);
    }
}
