//! Numerical building blocks shared by the scenarios.
//!
//! - Physics: ODE state/system traits and the RK4 integrator

pub mod physics;

pub use physics::{rk4_step, Integrator, OdeState, OdeSystem, RK4Integrator};
