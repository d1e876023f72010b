use thiserror::Error;

use crate::particles::ParticleHandle;

/// Error types for particle definitions and the particle manager
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParticleError {
    /// A definition field holds a value the simulation cannot run with
    #[error("Invalid definition: {field}: {reason}")]
    InvalidDefinition { field: String, reason: String },

    /// No running system is registered under the handle
    #[error("Unknown particle system handle: {0}")]
    UnknownHandle(ParticleHandle),

    /// No definition is registered under the name
    #[error("Unknown particle definition: {0}")]
    UnknownDefinition(String),
}

impl ParticleError {
    /// Shorthand for building an [`ParticleError::InvalidDefinition`]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using ParticleError
pub type Result<T> = std::result::Result<T, ParticleError>;
