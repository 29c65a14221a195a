//! Core pendulum engine.
//!
//! Owns the physical parameters, the state vector, the interaction state
//! and the trace buffer. Per frame the external driver:
//!
//! 1. forwards pointer events (`on_pointer_down`, `on_pointer_move`, `on_pointer_up`)
//! 2. writes parameter changes from the UI
//! 3. calls [`PendulumEngine::advance_frame`] (or `step_n` + `project_pose`)
//! 4. draws the returned pose and the trace points
//!
//! The engine never renders; it is single-threaded and every call
//! completes synchronously.

pub mod clock;
pub mod jidoka;
pub mod state;
pub mod trace;

use tracing::{debug, error, info, trace};

pub use clock::{SimClock, SimTime};
pub use jidoka::{Divergence, JidokaConfig, JidokaGuard};
pub use state::{CartesianPose, Point2, StateVector};
pub use trace::TraceBuffer;

use crate::config::SimConfig;
use crate::domains::physics::{Integrator, RK4Integrator};
use crate::error::SimResult;
use crate::interaction::{HeldBob, InteractionController, InteractionMode};
use crate::scenarios::pendulum::{total_energy, Parameter, PhysicalParameters};

/// Interactive double pendulum.
///
/// # Example
///
/// ```rust
/// use pendulum_sim::engine::PendulumEngine;
///
/// let mut engine = PendulumEngine::new((45.0, 0.0), (150.0, 150.0), (15.0, 30.0), (533.0, 300.0));
/// engine.step_n(10).unwrap();
/// let pose = engine.project_pose();
/// assert!(pose.pos2.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct PendulumEngine {
    params: PhysicalParameters,
    state: StateVector,
    /// Construction-time state restored by `reset()`.
    initial: StateVector,
    pivot: Point2,
    interaction: InteractionController,
    trace: TraceBuffer,
    trace_while_held: bool,
    guard: JidokaGuard,
    integrator: RK4Integrator,
    clock: SimClock,
    substeps: u32,
}

impl PendulumEngine {
    /// Default physical timestep per sub-step, in seconds.
    pub const DEFAULT_DT: f64 = 0.016;
    /// Default timestep in clock units.
    const DEFAULT_DT_NANOS: u64 = 16_000_000;
    /// Default sub-steps per frame.
    pub const DEFAULT_SUBSTEPS: u32 = 10;
    /// Default trace capacity.
    pub const DEFAULT_TRACE_CAPACITY: usize = 100;
    /// Default gravitational acceleration.
    pub const DEFAULT_GRAVITY: f64 = 9.81;

    /// Create an engine at rest.
    ///
    /// `initial_angles_deg` are in degrees from the downward vertical;
    /// `lengths`, `masses` and `pivot` are `(first, second)` / `(x, y)`.
    /// Gravity, timestep, sub-steps and trace capacity take their defaults.
    #[must_use]
    pub fn new(
        initial_angles_deg: (f64, f64),
        lengths: (f64, f64),
        masses: (f64, f64),
        pivot: (f64, f64),
    ) -> Self {
        let params = PhysicalParameters {
            m1: masses.0,
            m2: masses.1,
            l1: lengths.0,
            l2: lengths.1,
            g: Self::DEFAULT_GRAVITY,
        };
        let initial = StateVector::at_rest(
            initial_angles_deg.0.to_radians(),
            initial_angles_deg.1.to_radians(),
        );
        let integrator = RK4Integrator::new();

        info!(
            theta1 = initial.theta1,
            theta2 = initial.theta2,
            l1 = params.l1,
            l2 = params.l2,
            m1 = params.m1,
            m2 = params.m2,
            integrator_order = integrator.error_order(),
            symplectic = integrator.is_symplectic(),
            "Pendulum engine created"
        );

        Self {
            params,
            state: initial,
            initial,
            pivot: pivot.into(),
            interaction: InteractionController::new(),
            trace: TraceBuffer::new(Self::DEFAULT_TRACE_CAPACITY),
            trace_while_held: false,
            guard: JidokaGuard::default(),
            integrator,
            clock: SimClock::from_nanos(Self::DEFAULT_DT_NANOS),
            substeps: Self::DEFAULT_SUBSTEPS,
        }
    }

    /// Create an engine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation.
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        config.check()?;

        let p = &config.pendulum;
        let mut engine = Self::new(
            (p.initial_angles[0], p.initial_angles[1]),
            (p.lengths[0], p.lengths[1]),
            (p.masses[0], p.masses[1]),
            (p.pivot[0], p.pivot[1]),
        );
        engine.params.g = p.g;
        engine.clock = SimClock::new(config.integration.dt)?;
        engine.substeps = config.integration.substeps;
        engine.trace = TraceBuffer::new(config.trace.capacity);
        engine.trace_while_held = config.trace.while_held;
        engine.guard = JidokaGuard::new(config.jidoka.clone());
        Ok(engine)
    }

    // ===== Integration =====

    /// Advance one fixed timestep.
    ///
    /// A no-op while a bob is held. Angles are wrapped into `[0, 2π)`
    /// afterwards; velocities are left as integrated.
    ///
    /// # Errors
    ///
    /// Returns `DivergedState` if the current state fails the guard or
    /// any RK4 stage is non-finite. The state is left untouched.
    pub fn step(&mut self) -> SimResult<()> {
        if self.interaction.mode().is_holding() {
            return Ok(());
        }

        self.guard.check(&self.state).inspect_err(|e| {
            error!(error = %e, "Divergence detected before step, halting");
        })?;

        let next = self
            .integrator
            .step(&self.params, &self.state, self.clock.dt())
            .inspect_err(|e| {
                error!(error = %e, "Divergence detected during step, halting");
            })?;

        self.state = next.wrapped();
        let now = self.clock.tick();
        trace!(
            theta1 = self.state.theta1,
            theta2 = self.state.theta2,
            t = now.as_secs_f64(),
            "step"
        );
        Ok(())
    }

    /// Run `sub_steps` steps in order, stopping at the first fault.
    ///
    /// # Errors
    ///
    /// Returns the first `DivergedState`; remaining sub-steps are skipped.
    pub fn step_n(&mut self, sub_steps: u32) -> SimResult<()> {
        for _ in 0..sub_steps {
            self.step()?;
        }
        Ok(())
    }

    /// Run one rendered frame.
    ///
    /// While holding, re-applies the pointer override; otherwise runs the
    /// configured number of sub-steps. Then projects the pose and records
    /// the second bob in the trace (skipped while holding unless
    /// `trace.while_held` is set).
    ///
    /// # Errors
    ///
    /// Returns `DivergedState` from integration.
    pub fn advance_frame(&mut self) -> SimResult<CartesianPose> {
        let holding = self.interaction.mode().is_holding();
        if holding {
            self.apply_interaction();
        } else {
            self.step_n(self.substeps)?;
        }

        let pose = self.project_pose();
        if !holding || self.trace_while_held {
            self.trace.add(pose.pos2);
        }
        Ok(pose)
    }

    /// Project the current state onto screen space.
    #[must_use]
    pub fn project_pose(&self) -> CartesianPose {
        CartesianPose::project(&self.state, self.params.l1, self.params.l2, self.pivot)
    }

    /// Restore the construction-time angles with zero velocity and clear
    /// the trace. Parameters are left as they are.
    ///
    /// The interaction mode is not touched: a reset during a hold is
    /// overridden by the pointer on the next held frame. Call
    /// `on_pointer_up` first to drop the hold.
    pub fn reset(&mut self) {
        self.state = self.initial;
        self.trace.clear();
        self.clock.reset();
        info!(
            theta1 = self.state.theta1,
            theta2 = self.state.theta2,
            "Pendulum reset"
        );
    }

    // ===== Interaction =====

    /// Pointer pressed (or dragged with the button down) at `pos`.
    ///
    /// Starts a hold when `Free` and `pos` is over a bob; while holding,
    /// moves the held bob to follow `pos`. Returns the resulting mode.
    pub fn on_pointer_down(&mut self, pos: impl Into<Point2>) -> InteractionMode {
        let pos = pos.into();
        let pose = self.project_pose();
        let before = self.interaction.mode();
        let mode =
            self.interaction
                .pointer_down(pos, &pose, self.params.radius1(), self.params.radius2());

        if let InteractionMode::Holding(bob) = mode {
            if !before.is_holding() {
                info!(?bob, x = pos.x, y = pos.y, "Hold started");
            }
            self.apply_interaction();
        }
        mode
    }

    /// Pointer moved. Only matters while holding.
    pub fn on_pointer_move(&mut self, pos: impl Into<Point2>) {
        self.interaction.pointer_move(pos.into());
    }

    /// Pointer released. The held bob is let go with zero velocity.
    pub fn on_pointer_up(&mut self) {
        if let Some(bob) = self.interaction.pointer_up() {
            info!(
                ?bob,
                theta1 = self.state.theta1,
                theta2 = self.state.theta2,
                "Hold released"
            );
        }
    }

    /// Current interaction mode.
    #[must_use]
    pub const fn is_held(&self) -> InteractionMode {
        self.interaction.mode()
    }

    /// Override the held angle from the pointer, zero both velocities and
    /// clear the trace. Returns `false` (and does nothing) when `Free`.
    ///
    /// `on_pointer_down` and `advance_frame` call this; drivers that use
    /// `step_n` directly call it once per held frame.
    pub fn apply_interaction(&mut self) -> bool {
        let pose = self.project_pose();
        let Some((bob, angle)) = self.interaction.held_override(&pose) else {
            return false;
        };
        match bob {
            HeldBob::First => self.state.theta1 = angle,
            HeldBob::Second => self.state.theta2 = angle,
        }
        self.state.halt();
        if !self.trace_while_held {
            self.trace.clear();
        }
        true
    }

    // ===== Parameters =====

    /// Read a parameter by name.
    #[must_use]
    pub fn parameter(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::L1 => self.params.l1,
            Parameter::L2 => self.params.l2,
            Parameter::M1 => self.params.m1,
            Parameter::M2 => self.params.m2,
            Parameter::G => self.params.g,
            Parameter::TraceCapacity => self.trace.capacity() as f64,
        }
    }

    /// Write a parameter by name. Takes effect on the next step or
    /// projection; values are not range-checked.
    ///
    /// A fractional trace capacity rounds up; negative capacities become
    /// zero.
    pub fn set_parameter(&mut self, parameter: Parameter, value: f64) {
        debug!(%parameter, value, "Parameter set");
        match parameter {
            Parameter::L1 => self.params.l1 = value,
            Parameter::L2 => self.params.l2 = value,
            Parameter::M1 => self.params.m1 = value,
            Parameter::M2 => self.params.m2 = value,
            Parameter::G => self.params.g = value,
            Parameter::TraceCapacity => {
                let capacity = if value.is_nan() { 0.0 } else { value.max(0.0).ceil() };
                self.trace.set_capacity(capacity as usize);
            }
        }
    }

    /// Length of the first link.
    #[must_use]
    pub const fn l1(&self) -> f64 {
        self.params.l1
    }

    /// Set the length of the first link.
    pub fn set_l1(&mut self, value: f64) {
        self.set_parameter(Parameter::L1, value);
    }

    /// Length of the second link.
    #[must_use]
    pub const fn l2(&self) -> f64 {
        self.params.l2
    }

    /// Set the length of the second link.
    pub fn set_l2(&mut self, value: f64) {
        self.set_parameter(Parameter::L2, value);
    }

    /// Mass of the first bob.
    #[must_use]
    pub const fn m1(&self) -> f64 {
        self.params.m1
    }

    /// Set the mass of the first bob. Its radius follows.
    pub fn set_m1(&mut self, value: f64) {
        self.set_parameter(Parameter::M1, value);
    }

    /// Mass of the second bob.
    #[must_use]
    pub const fn m2(&self) -> f64 {
        self.params.m2
    }

    /// Set the mass of the second bob. Its radius follows.
    pub fn set_m2(&mut self, value: f64) {
        self.set_parameter(Parameter::M2, value);
    }

    /// Gravitational acceleration.
    #[must_use]
    pub const fn g(&self) -> f64 {
        self.params.g
    }

    /// Set gravitational acceleration.
    pub fn set_g(&mut self, value: f64) {
        self.set_parameter(Parameter::G, value);
    }

    /// Trace capacity.
    #[must_use]
    pub const fn trace_capacity(&self) -> usize {
        self.trace.capacity()
    }

    /// Set trace capacity; excess oldest points are dropped.
    pub fn set_trace_capacity(&mut self, capacity: usize) {
        debug!(capacity, "Trace capacity set");
        self.trace.set_capacity(capacity);
    }

    /// Render radius of the first bob.
    #[must_use]
    pub fn radius1(&self) -> f64 {
        self.params.radius1()
    }

    /// Render radius of the second bob.
    #[must_use]
    pub fn radius2(&self) -> f64 {
        self.params.radius2()
    }

    // ===== Accessors =====

    /// Current state vector.
    #[must_use]
    pub const fn state(&self) -> &StateVector {
        &self.state
    }

    /// Current physical parameters.
    #[must_use]
    pub const fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    /// Fixed pivot position.
    #[must_use]
    pub const fn pivot(&self) -> Point2 {
        self.pivot
    }

    /// Trace buffer.
    #[must_use]
    pub const fn trace_buffer(&self) -> &TraceBuffer {
        &self.trace
    }

    /// Snapshot of the trace, oldest first.
    #[must_use]
    pub fn current_trace_points(&self) -> Vec<(f64, f64)> {
        self.trace.iter().map(|&p| p.into()).collect()
    }

    /// Total mechanical energy of the current state.
    #[must_use]
    pub fn energy(&self) -> f64 {
        total_energy(&self.state, &self.params)
    }

    /// Simulated time since construction or the last reset.
    #[must_use]
    pub const fn elapsed(&self) -> SimTime {
        self.clock.current_time()
    }

    /// Steps integrated since construction or the last reset.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.clock.step_count()
    }

    /// Timestep per sub-step, in seconds.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.clock.dt()
    }

    /// Integrator used by `step`.
    #[must_use]
    pub const fn integrator(&self) -> &RK4Integrator {
        &self.integrator
    }

    /// Sub-steps per frame used by `advance_frame`.
    #[must_use]
    pub const fn substeps(&self) -> u32 {
        self.substeps
    }

    /// Replace the state directly (e.g. to restore a snapshot).
    ///
    /// The guard runs on the next step.
    pub fn set_state(&mut self, state: StateVector) {
        self.state = state;
    }
}
