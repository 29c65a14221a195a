//! Error types for the pendulum engine.
//!
//! All fallible operations return `Result<T, SimError>` instead of
//! panicking. The only runtime fault is [`SimError::DivergedState`]; the
//! remaining variants come from loading configuration.

use thiserror::Error;

use crate::engine::jidoka::Divergence;

/// Result type alias for engine operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for the engine.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Jidoka Violations =====
    /// Integration produced (or was handed) a state it cannot continue from.
    ///
    /// The render loop is expected to stop ticking the engine.
    #[error("Jidoka: diverged state, {0}")]
    DivergedState(#[from] Divergence),

    // ===== Parameter Errors =====
    /// A parameter name did not match any known parameter.
    #[error("Unknown parameter '{name}'")]
    UnknownParameter {
        /// The name that failed to parse.
        name: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an unknown-parameter error.
    #[must_use]
    pub fn unknown_parameter(name: impl Into<String>) -> Self {
        Self::UnknownParameter { name: name.into() }
    }

    /// Check if this error is a divergence fault (session must halt).
    #[must_use]
    pub const fn is_divergence(&self) -> bool {
        matches!(self, Self::DivergedState(_))
    }

    /// The divergence cause, if this is a divergence fault.
    #[must_use]
    pub const fn divergence(&self) -> Option<&Divergence> {
        match self {
            Self::DivergedState(cause) => Some(cause),
            _ => None,
        }
    }
}
