//! Physics domain: fixed-step numerical integration.
//!
//! Implements classic fourth-order Runge-Kutta over any state type that
//! supports vector arithmetic. There is no adaptive step sizing and no
//! error estimate: a frame always costs the same number of derivative
//! evaluations.
//!
//! # Stage Checks
//!
//! Every stage derivative is inspected for NaN/Inf before it is used.
//! A non-finite stage aborts the step with
//! [`SimError::DivergedState`](crate::error::SimError::DivergedState)
//! and leaves the caller's state untouched.

use std::ops::{Add, Mul};

use crate::engine::jidoka::Divergence;
use crate::error::SimResult;

/// State of an ordinary differential equation.
pub trait OdeState: Copy + Add<Output = Self> + Mul<f64, Output = Self> {
    /// Name of the first non-finite component, if any.
    fn first_non_finite(&self) -> Option<&'static str>;
}

/// A system `dY/dt = f(Y)`.
pub trait OdeSystem<S> {
    /// Evaluate the time derivative at `state`.
    fn derivative(&self, state: &S) -> S;
}

impl<S, F> OdeSystem<S> for F
where
    F: Fn(&S) -> S,
{
    fn derivative(&self, state: &S) -> S {
        self(state)
    }
}

/// Numerical integrator trait.
pub trait Integrator {
    /// Advance `state` by one timestep and return the new state.
    ///
    /// # Errors
    ///
    /// Returns `DivergedState` if any intermediate value is non-finite.
    fn step<S, F>(&self, system: &F, state: &S, dt: f64) -> SimResult<S>
    where
        S: OdeState,
        F: OdeSystem<S> + ?Sized;

    /// Get the error order of this integrator.
    fn error_order(&self) -> u32;

    /// Check if integrator is symplectic (preserves phase space volume).
    fn is_symplectic(&self) -> bool;
}

/// Runge-Kutta 4th order integrator.
///
/// Fourth-order accurate, non-symplectic. Energy may drift slowly over
/// long runs.
///
/// Algorithm (classical RK4):
/// ```text
/// k1 = f(Y)
/// k2 = f(Y + h/2 * k1)
/// k3 = f(Y + h/2 * k2)
/// k4 = f(Y + h * k3)
/// Y' = Y + h/6 * (k1 + 2*k2 + 2*k3 + k4)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4Integrator;

impl RK4Integrator {
    /// Create a new RK4 integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Integrator for RK4Integrator {
    fn step<S, F>(&self, system: &F, state: &S, dt: f64) -> SimResult<S>
    where
        S: OdeState,
        F: OdeSystem<S> + ?Sized,
    {
        rk4_step(state, dt, system)
    }

    fn error_order(&self) -> u32 {
        4
    }

    fn is_symplectic(&self) -> bool {
        false
    }
}

/// One classic RK4 step of size `dt`.
///
/// # Errors
///
/// Returns `DivergedState` naming the stage and component that went
/// non-finite (e.g. `rk4.k3.omega2`).
pub fn rk4_step<S, F>(state: &S, dt: f64, system: &F) -> SimResult<S>
where
    S: OdeState,
    F: OdeSystem<S> + ?Sized,
{
    let half_dt = dt / 2.0;

    let k1 = checked_stage(system.derivative(state), "k1")?;
    let k2 = checked_stage(system.derivative(&(*state + k1 * half_dt)), "k2")?;
    let k3 = checked_stage(system.derivative(&(*state + k2 * half_dt)), "k3")?;
    let k4 = checked_stage(system.derivative(&(*state + k3 * dt)), "k4")?;

    let next = *state + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);
    checked_stage(next, "result")
}

fn checked_stage<S: OdeState>(value: S, stage: &str) -> SimResult<S> {
    match value.first_non_finite() {
        None => Ok(value),
        Some(component) => Err(Divergence::NonFinite {
            location: format!("rk4.{stage}.{component}"),
        }
        .into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::state::StateVector;
    use crate::error::SimError;

    /// Harmonic oscillator on the first angle: θ'' = -θ.
    fn oscillator(s: &StateVector) -> StateVector {
        StateVector::new(s.omega1, 0.0, -s.theta1, 0.0)
    }

    #[test]
    fn test_rk4_properties() {
        let rk4 = RK4Integrator::new();
        assert_eq!(rk4.error_order(), 4);
        assert!(!rk4.is_symplectic());
    }

    #[test]
    fn test_rk4_zero_derivative_is_identity() {
        let state = StateVector::new(1.0, 2.0, 3.0, 4.0);
        let zero = |_: &StateVector| StateVector::default();
        let next = rk4_step(&state, 0.1, &zero).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn test_rk4_constant_velocity() {
        let state = StateVector::new(0.0, 0.0, 2.0, -1.0);
        let drift = |s: &StateVector| StateVector::new(s.omega1, s.omega2, 0.0, 0.0);
        let next = rk4_step(&state, 0.5, &drift).unwrap();
        assert!((next.theta1 - 1.0).abs() < 1e-12);
        assert!((next.theta2 + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rk4_oscillator_period() {
        // One full period of θ'' = -θ returns to the start.
        let rk4 = RK4Integrator::new();
        let steps = 1000;
        let dt = std::f64::consts::TAU / f64::from(steps);
        let mut state = StateVector::new(1.0, 0.0, 0.0, 0.0);
        for _ in 0..steps {
            state = rk4.step(&oscillator, &state, dt).unwrap();
        }
        assert!((state.theta1 - 1.0).abs() < 1e-9, "theta1={}", state.theta1);
        assert!(state.omega1.abs() < 1e-9, "omega1={}", state.omega1);
    }

    #[test]
    fn test_rk4_fourth_order_convergence() {
        let run = |dt: f64| {
            let mut state = StateVector::new(1.0, 0.0, 0.0, 0.0);
            let n = (1.0 / dt).round() as usize;
            for _ in 0..n {
                state = rk4_step(&state, dt, &oscillator).unwrap();
            }
            (state.theta1 - 1.0_f64.cos()).abs()
        };
        let coarse = run(0.1);
        let fine = run(0.05);
        // Halving dt should cut the error by ~16x.
        assert!(coarse / fine > 12.0, "ratio={}", coarse / fine);
    }

    #[test]
    fn test_rk4_detects_nan_stage() {
        let state = StateVector::new(1.0, 0.0, 0.0, 0.0);
        let bad = |s: &StateVector| StateVector::new(s.omega1, 0.0, f64::NAN, 0.0);
        let err = rk4_step(&state, 0.1, &bad).unwrap_err();
        match err {
            SimError::DivergedState(Divergence::NonFinite { location }) => {
                assert_eq!(location, "rk4.k1.omega1");
            }
            other => panic!("Expected NonFinite divergence, got {other:?}"),
        }
    }

    #[test]
    fn test_rk4_detects_late_stage_blowup() {
        // Finite at the start, infinite once theta1 moves.
        let state = StateVector::new(0.0, 0.0, 1.0, 0.0);
        let singular = |s: &StateVector| {
            let accel = if s.theta1 > 0.0 { f64::INFINITY } else { 0.0 };
            StateVector::new(s.omega1, 0.0, accel, 0.0)
        };
        let err = rk4_step(&state, 0.1, &singular).unwrap_err();
        let location = match err.divergence() {
            Some(Divergence::NonFinite { location }) => location.clone(),
            other => panic!("Expected NonFinite divergence, got {other:?}"),
        };
        assert_eq!(location, "rk4.k2.omega1");
    }
}
