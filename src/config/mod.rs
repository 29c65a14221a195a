//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Derive validation via `validator`
//! - Runtime semantic validation
//!
//! Validation applies to configuration files only. Parameter writes made
//! by the UI at runtime are never checked by the engine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::engine::jidoka::JidokaConfig;
use crate::error::{SimError, SimResult};

/// Top-level simulation configuration.
///
/// # Example
///
/// ```rust
/// use pendulum_sim::config::SimConfig;
///
/// let config = SimConfig::from_yaml(
///     "pendulum:\n  initial_angles: [90.0, 0.0]\nintegration:\n  substeps: 4\n",
/// )
/// .unwrap();
/// assert_eq!(config.integration.substeps, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Initial configuration and physical parameters.
    #[validate(nested)]
    #[serde(default)]
    pub pendulum: PendulumSetup,

    /// Fixed-step integration settings.
    #[validate(nested)]
    #[serde(default)]
    pub integration: IntegrationConfig,

    /// Trace buffer settings.
    #[serde(default)]
    pub trace: TraceConfig,

    /// Jidoka (stop-on-divergence) configuration.
    #[serde(default)]
    pub jidoka: JidokaConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            pendulum: PendulumSetup::default(),
            integration: IntegrationConfig::default(),
            trace: TraceConfig::default(),
            jidoka: JidokaConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::default()
    }

    /// Run derive and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> SimResult<()> {
        let p = &self.pendulum;

        let finite = [
            ("initial_angles", p.initial_angles.as_slice()),
            ("lengths", p.lengths.as_slice()),
            ("masses", p.masses.as_slice()),
            ("pivot", p.pivot.as_slice()),
            ("g", std::slice::from_ref(&p.g)),
        ];
        for (name, values) in finite {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(SimError::config(format!("pendulum.{name} must be finite")));
            }
        }
        if !self.integration.dt.is_finite() {
            return Err(SimError::config("integration.dt must be finite"));
        }

        if p.lengths.iter().any(|&l| l <= 0.0) {
            return Err(SimError::config(format!(
                "Link lengths must be positive, got {:?}",
                p.lengths
            )));
        }
        if p.masses.iter().any(|&m| m <= 0.0) {
            return Err(SimError::config(format!(
                "Masses must be positive, got {:?}",
                p.masses
            )));
        }
        if !self.jidoka.angle_limit.is_finite() || self.jidoka.angle_limit <= 0.0 {
            return Err(SimError::config("jidoka.angle_limit must be positive and finite"));
        }

        Ok(())
    }
}

/// Initial configuration and physical parameters of the pendulum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PendulumSetup {
    /// Initial link angles in degrees from the downward vertical.
    #[serde(default = "default_initial_angles")]
    pub initial_angles: [f64; 2],
    /// Link lengths.
    #[serde(default = "default_lengths")]
    pub lengths: [f64; 2],
    /// Bob masses.
    #[serde(default = "default_masses")]
    pub masses: [f64; 2],
    /// Fixed anchor of the first link, in screen coordinates.
    #[serde(default = "default_pivot")]
    pub pivot: [f64; 2],
    /// Gravitational acceleration.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_gravity")]
    pub g: f64,
}

const fn default_initial_angles() -> [f64; 2] {
    [1.0, 1.0]
}

const fn default_lengths() -> [f64; 2] {
    [150.0, 150.0]
}

const fn default_masses() -> [f64; 2] {
    [15.0, 30.0]
}

/// One third of a 1600x900 surface.
const fn default_pivot() -> [f64; 2] {
    [533.0, 300.0]
}

const fn default_gravity() -> f64 {
    9.81
}

impl Default for PendulumSetup {
    fn default() -> Self {
        Self {
            initial_angles: default_initial_angles(),
            lengths: default_lengths(),
            masses: default_masses(),
            pivot: default_pivot(),
            g: default_gravity(),
        }
    }
}

/// Fixed-step integration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct IntegrationConfig {
    /// Physical timestep per sub-step, in seconds.
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    #[serde(default = "default_timestep")]
    pub dt: f64,
    /// Integration sub-steps per rendered frame.
    #[validate(range(min = 1))]
    #[serde(default = "default_substeps")]
    pub substeps: u32,
}

const fn default_timestep() -> f64 {
    0.016
}

const fn default_substeps() -> u32 {
    10
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            dt: default_timestep(),
            substeps: default_substeps(),
        }
    }
}

/// Trace buffer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceConfig {
    /// Number of recent positions kept.
    #[serde(default = "default_trace_capacity")]
    pub capacity: usize,
    /// Keep recording while a bob is held.
    #[serde(default)]
    pub while_held: bool,
}

const fn default_trace_capacity() -> usize {
    100
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            capacity: default_trace_capacity(),
            while_held: false,
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SimConfigBuilder {
    initial_angles: Option<[f64; 2]>,
    lengths: Option<[f64; 2]>,
    masses: Option<[f64; 2]>,
    pivot: Option<[f64; 2]>,
    gravity: Option<f64>,
    timestep: Option<f64>,
    substeps: Option<u32>,
    trace_capacity: Option<usize>,
    jidoka: Option<JidokaConfig>,
}

impl SimConfigBuilder {
    /// Set initial angles in degrees.
    #[must_use]
    pub const fn initial_angles(mut self, theta1_deg: f64, theta2_deg: f64) -> Self {
        self.initial_angles = Some([theta1_deg, theta2_deg]);
        self
    }

    /// Set link lengths.
    #[must_use]
    pub const fn lengths(mut self, l1: f64, l2: f64) -> Self {
        self.lengths = Some([l1, l2]);
        self
    }

    /// Set bob masses.
    #[must_use]
    pub const fn masses(mut self, m1: f64, m2: f64) -> Self {
        self.masses = Some([m1, m2]);
        self
    }

    /// Set pivot position.
    #[must_use]
    pub const fn pivot(mut self, x: f64, y: f64) -> Self {
        self.pivot = Some([x, y]);
        self
    }

    /// Set gravitational acceleration.
    #[must_use]
    pub const fn gravity(mut self, g: f64) -> Self {
        self.gravity = Some(g);
        self
    }

    /// Set the timestep in seconds.
    #[must_use]
    pub const fn timestep(mut self, dt: f64) -> Self {
        self.timestep = Some(dt);
        self
    }

    /// Set sub-steps per frame.
    #[must_use]
    pub const fn substeps(mut self, substeps: u32) -> Self {
        self.substeps = Some(substeps);
        self
    }

    /// Set trace capacity.
    #[must_use]
    pub const fn trace_capacity(mut self, capacity: usize) -> Self {
        self.trace_capacity = Some(capacity);
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JidokaConfig doesn't impl Copy
    pub fn jidoka(mut self, config: JidokaConfig) -> Self {
        self.jidoka = Some(config);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SimConfig {
        let mut config = SimConfig::default();

        if let Some(angles) = self.initial_angles {
            config.pendulum.initial_angles = angles;
        }
        if let Some(lengths) = self.lengths {
            config.pendulum.lengths = lengths;
        }
        if let Some(masses) = self.masses {
            config.pendulum.masses = masses;
        }
        if let Some(pivot) = self.pivot {
            config.pendulum.pivot = pivot;
        }
        if let Some(g) = self.gravity {
            config.pendulum.g = g;
        }
        if let Some(dt) = self.timestep {
            config.integration.dt = dt;
        }
        if let Some(substeps) = self.substeps {
            config.integration.substeps = substeps;
        }
        if let Some(capacity) = self.trace_capacity {
            config.trace.capacity = capacity;
        }
        if let Some(jidoka) = self.jidoka {
            config.jidoka = jidoka;
        }

        config
    }
}
