//! # pendulum-sim
//!
//! Interactive double pendulum physics engine.
//!
//! Integrates the coupled equations of motion of two point masses on
//! massless rigid links with classic fourth-order Runge-Kutta, projects
//! the state onto 2D screen space, and lets a pointer grab, drag and
//! release either bob. Rendering is left to the caller.
//!
//! Numerical faults stop the line instead of propagating: a Jidoka guard
//! checks every state before it is stepped and every RK4 stage is checked
//! for non-finite values.
//!
//! ## Example
//!
//! ```rust
//! use pendulum_sim::prelude::*;
//!
//! let mut engine = PendulumEngine::new((120.0, -10.0), (150.0, 150.0), (15.0, 30.0), (533.0, 300.0));
//! let pose = engine.advance_frame().unwrap();
//! assert_eq!(engine.current_trace_points().len(), 1);
//! assert!(pose.pos2.is_finite());
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Equations are kept in their textbook form
    clippy::imprecise_flops,
    clippy::many_single_char_names,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod config;
pub mod domains;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod scenarios;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{SimConfig, SimConfigBuilder};
    pub use crate::domains::physics::{Integrator, RK4Integrator};
    pub use crate::engine::jidoka::{Divergence, JidokaConfig, JidokaGuard};
    pub use crate::engine::state::{CartesianPose, Point2, StateVector};
    pub use crate::engine::trace::TraceBuffer;
    pub use crate::engine::{PendulumEngine, SimTime};
    pub use crate::error::{SimError, SimResult};
    pub use crate::interaction::{HeldBob, InteractionMode};
    pub use crate::scenarios::pendulum::{Parameter, PhysicalParameters};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
