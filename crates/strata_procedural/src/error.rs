//! # Generation Error Types
//!
//! All errors that can occur while configuring or running the pipeline.

use std::fmt;

use thiserror::Error;

/// A pluggable strategy slot on the world generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategySlot {
    /// The biome generator.
    BiomeGenerator,
    /// The base generation populator (raw terrain).
    BaseGenerator,
}

impl fmt::Display for StrategySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BiomeGenerator => f.write_str("biome generator"),
            Self::BaseGenerator => f.write_str("base generator"),
        }
    }
}

/// Errors that can occur in the generation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Biome settings failed validation at build time.
    #[error("invalid biome settings: {reason}")]
    InvalidSettings {
        /// What was wrong.
        reason: String,
    },

    /// A strategy slot was already overridden by another extension.
    #[error("{slot} already overridden by '{owner}' (installed strategy: {strategy})")]
    OverrideConflict {
        /// The contested slot.
        slot: StrategySlot,
        /// Who installed the current strategy.
        owner: String,
        /// Name of the current strategy.
        strategy: String,
    },

    /// A populator failed; the remaining populators of the phase were skipped.
    #[error("populator '{populator}' failed: {reason}")]
    Populator {
        /// Name of the failing populator.
        populator: String,
        /// Failure description.
        reason: String,
    },

    /// Invalid world configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Not a single generation worker thread could be started.
    #[error("no generation worker started ({requested} requested): {reason}")]
    NoWorkers {
        /// Workers the region asked for.
        requested: usize,
        /// Last spawn failure.
        reason: String,
    },

    /// Chunk sink failure.
    #[error("chunk sink i/o error: {0}")]
    Io(String),
}

impl GenerationError {
    /// Shorthand for a settings validation failure.
    pub(crate) fn invalid_settings(reason: impl Into<String>) -> Self {
        Self::InvalidSettings {
            reason: reason.into(),
        }
    }

    /// Shorthand for a populator failure.
    #[must_use]
    pub fn populator(populator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Populator {
            populator: populator.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for generation operations.
pub type GenResult<T> = Result<T, GenerationError>;
