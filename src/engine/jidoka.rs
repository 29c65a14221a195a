//! Jidoka (自働化) - stop the line on numerical blow-up.
//!
//! The double pendulum is chaotic and its equations of motion have a
//! near-singular denominator, so integration can run away. The guard
//! inspects the state before every step and refuses to continue from:
//!
//! 1. **Angle overflow**: `|θ1|` or `|θ2|` above the configured limit
//! 2. **Non-finite values**: NaN or Inf in any angle or velocity
//!
//! NaN compares false against every threshold, so a magnitude test alone
//! never fires on NaN; the finite check is separate and on by default.
//! Per-stage checks inside RK4 live in [`crate::domains::physics`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domains::physics::OdeState;
use crate::engine::state::StateVector;
use crate::error::SimResult;

/// Default magnitude above which an angle is considered diverged.
pub const DEFAULT_ANGLE_LIMIT: f64 = 1e6;

/// Why a state was declared diverged.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum Divergence {
    /// Raw angle magnitude exceeded the limit before a step.
    #[error("{location} magnitude {value:.3e} exceeds limit {limit:.1e}")]
    AngleOverflow {
        /// Which angle overflowed (`theta1` or `theta2`).
        location: String,
        /// The offending value.
        value: f64,
        /// Configured limit.
        limit: f64,
    },
    /// NaN or Inf in the state or in an integration stage.
    #[error("non-finite value at {location}")]
    NonFinite {
        /// Where the value was found (e.g. `omega1`, `rk4.k2.theta2`).
        location: String,
    },
}

/// Jidoka guard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JidokaConfig {
    /// Maximum allowed raw angle magnitude (radians).
    #[serde(default = "default_angle_limit")]
    pub angle_limit: f64,
    /// NaN/Inf detection enabled.
    #[serde(default = "default_check_finite")]
    pub check_finite: bool,
}

const fn default_angle_limit() -> f64 {
    DEFAULT_ANGLE_LIMIT
}

const fn default_check_finite() -> bool {
    true
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            angle_limit: DEFAULT_ANGLE_LIMIT,
            check_finite: true,
        }
    }
}

/// Pre-step guard for autonomous divergence detection.
///
/// # Example
///
/// ```rust
/// use pendulum_sim::engine::jidoka::{JidokaConfig, JidokaGuard};
/// use pendulum_sim::engine::state::StateVector;
///
/// let guard = JidokaGuard::new(JidokaConfig::default());
/// assert!(guard.check(&StateVector::at_rest(0.1, 0.2)).is_ok());
/// assert!(guard.check(&StateVector::at_rest(2e6, 0.0)).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JidokaGuard {
    config: JidokaConfig,
}

impl JidokaGuard {
    /// Create a new guard with the given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self { config }
    }

    /// Check a state before integrating from it.
    ///
    /// # Errors
    ///
    /// Returns `DivergedState` if an angle exceeds the limit or any
    /// component is non-finite.
    pub fn check(&self, state: &StateVector) -> SimResult<()> {
        if self.config.check_finite {
            if let Some(location) = state.first_non_finite() {
                return Err(Divergence::NonFinite {
                    location: location.to_string(),
                }
                .into());
            }
        }

        for (location, value) in [("theta1", state.theta1), ("theta2", state.theta2)] {
            if value.abs() > self.config.angle_limit {
                return Err(Divergence::AngleOverflow {
                    location: location.to_string(),
                    value,
                    limit: self.config.angle_limit,
                }
                .into());
            }
        }

        Ok(())
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }
}
