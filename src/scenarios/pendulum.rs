//! Double pendulum dynamics.
//!
//! Two rigid massless links joined by frictionless pivots, each ending
//! in a point mass. Angles are measured from the downward vertical and
//! the screen y axis points down, so a hanging pendulum has `θ = 0`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domains::physics::OdeSystem;
use crate::engine::state::StateVector;
use crate::error::SimError;

/// Largest radius a bob is drawn with.
pub const MAX_BOB_RADIUS: f64 = 30.0;

/// Render radius for a bob of the given mass: `min(1.5 m, 30)`.
#[must_use]
pub fn bob_radius(mass: f64) -> f64 {
    (mass * 1.5).min(MAX_BOB_RADIUS)
}

/// Masses, link lengths and gravity.
///
/// No invariant is enforced here; the UI keeps values in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameters {
    /// Mass of the first bob.
    pub m1: f64,
    /// Mass of the second bob.
    pub m2: f64,
    /// Length of the first link.
    pub l1: f64,
    /// Length of the second link.
    pub l2: f64,
    /// Gravitational acceleration.
    pub g: f64,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            m1: 15.0,
            m2: 30.0,
            l1: 150.0,
            l2: 150.0,
            g: 9.81,
        }
    }
}

impl PhysicalParameters {
    /// Render radius of the first bob, derived from `m1`.
    #[must_use]
    pub fn radius1(&self) -> f64 {
        bob_radius(self.m1)
    }

    /// Render radius of the second bob, derived from `m2`.
    #[must_use]
    pub fn radius2(&self) -> f64 {
        bob_radius(self.m2)
    }
}

impl OdeSystem<StateVector> for PhysicalParameters {
    fn derivative(&self, state: &StateVector) -> StateVector {
        derivative(state, self)
    }
}

/// Time derivative of the double pendulum state.
///
/// Returns `(ω1, ω2, f1, f2)` where
/// ```text
/// Δ  = θ1 − θ2
/// f1 = [−m2(L1 ω1² sinΔ cosΔ + L2 ω2² sinΔ) + g((m1+m2)(−sin θ1) + m2 cosΔ sin θ2)]
///      / (m1 L1 + m2 L1 sin²Δ)
/// f2 = [(m1+m2) L1 ω1² sinΔ + m2 L2 ω2² sinΔ cosΔ + (m1+m2) g (sin θ1 cosΔ − sin θ2)]
///      / (m1 L2 + m2 L2 sin²Δ)
/// ```
/// A zero denominator is not special-cased; the resulting NaN/Inf is
/// caught by the integrator's stage checks.
#[must_use]
pub fn derivative(state: &StateVector, params: &PhysicalParameters) -> StateVector {
    let PhysicalParameters { m1, m2, l1, l2, g } = *params;
    let StateVector {
        theta1,
        theta2,
        omega1,
        omega2,
    } = *state;

    let (sin_d, cos_d) = (theta1 - theta2).sin_cos();
    let sin1 = theta1.sin();
    let sin2 = theta2.sin();
    let w1_sq = omega1 * omega1;
    let w2_sq = omega2 * omega2;
    let total_mass = m1 + m2;
    let coupling = m1 + m2 * sin_d * sin_d;

    let f1 = (-m2 * (l1 * w1_sq * sin_d * cos_d + l2 * w2_sq * sin_d)
        + g * (total_mass * -sin1 + m2 * cos_d * sin2))
        / (l1 * coupling);

    let f2 = (total_mass * l1 * w1_sq * sin_d
        + m2 * l2 * w2_sq * sin_d * cos_d
        + total_mass * g * (sin1 * cos_d - sin2))
        / (l2 * coupling);

    StateVector::new(omega1, omega2, f1, f2)
}

/// Total mechanical energy (kinetic + potential).
///
/// Potential is measured from the pivot height with y pointing down, so
/// the hanging rest state has the minimum energy
/// `−(m1 + m2) g L1 − m2 g L2`.
#[must_use]
pub fn total_energy(state: &StateVector, params: &PhysicalParameters) -> f64 {
    let PhysicalParameters { m1, m2, l1, l2, g } = *params;
    let StateVector {
        theta1,
        theta2,
        omega1,
        omega2,
    } = *state;

    let v1_sq = l1 * l1 * omega1 * omega1;
    let v2_sq = v1_sq
        + l2 * l2 * omega2 * omega2
        + 2.0 * l1 * l2 * omega1 * omega2 * (theta1 - theta2).cos();
    let kinetic = 0.5 * m1 * v1_sq + 0.5 * m2 * v2_sq;

    let potential = -(m1 + m2) * g * l1 * theta1.cos() - m2 * g * l2 * theta2.cos();

    kinetic + potential
}

/// A scalar the external UI may read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Length of the first link.
    L1,
    /// Length of the second link.
    L2,
    /// Mass of the first bob.
    M1,
    /// Mass of the second bob.
    M2,
    /// Gravitational acceleration.
    G,
    /// Number of trace points kept.
    TraceCapacity,
}

/// Advisory slider range for a parameter. Never enforced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Slider increment.
    pub step: f64,
}

impl ParameterRange {
    /// Whether `value` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Parameter {
    /// All parameters, in panel order.
    pub const ALL: [Self; 6] = [
        Self::L1,
        Self::L2,
        Self::M1,
        Self::M2,
        Self::G,
        Self::TraceCapacity,
    ];

    /// Short machine name (`l1`, `trace_capacity`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::L1 => "l1",
            Self::L2 => "l2",
            Self::M1 => "m1",
            Self::M2 => "m2",
            Self::G => "g",
            Self::TraceCapacity => "trace_capacity",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::L1 => "Length 1",
            Self::L2 => "Length 2",
            Self::M1 => "Mass 1",
            Self::M2 => "Mass 2",
            Self::G => "Gravity",
            Self::TraceCapacity => "Trace Points",
        }
    }

    /// Slider range the parameter panel offers.
    #[must_use]
    pub const fn ui_range(self) -> ParameterRange {
        let (min, max, step) = match self {
            Self::L1 | Self::L2 => (10.0, 500.0, 10.0),
            Self::M1 | Self::M2 => (1.0, 50.0, 1.0),
            Self::G => (0.0, 20.0, 0.1),
            Self::TraceCapacity => (10.0, 3000.0, 0.1),
        };
        ParameterRange { min, max, step }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "l1" | "length_1" | "length1" => Ok(Self::L1),
            "l2" | "length_2" | "length2" => Ok(Self::L2),
            "m1" | "mass_1" | "mass1" => Ok(Self::M1),
            "m2" | "mass_2" | "mass2" => Ok(Self::M2),
            "g" | "gravity" => Ok(Self::G),
            "trace_capacity" | "trace_points" | "tracepoints" => Ok(Self::TraceCapacity),
            _ => Err(SimError::unknown_parameter(s)),
        }
    }
}
