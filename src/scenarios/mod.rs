//! Pre-built simulation scenarios.
//!
//! - Double pendulum: equations of motion, energy, tunable parameters

pub mod pendulum;

pub use pendulum::{Parameter, ParameterRange, PhysicalParameters};
