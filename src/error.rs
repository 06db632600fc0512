//! Error types for the route optimizer.

use thiserror::Error;

/// Errors raised by the engine, its operators and the shared handle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A configuration value is out of range or names an unknown method.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A city list or depot/final index supplied by the caller is unusable.
    #[error("invalid city data: {0}")]
    InvalidCity(String),

    /// An individual is not a permutation of the city indices.
    ///
    /// Never raised under correct operator composition; indicates a defect
    /// or corrupted input.
    #[error("corrupted permutation: value {value} not found")]
    CorruptedPermutation {
        /// The value that could not be located.
        value: usize,
    },

    /// The population is empty, so there is no best individual.
    #[error("population is empty")]
    EmptyPopulation,

    /// A thread panicked while holding the engine lock.
    #[error("engine lock poisoned")]
    LockPoisoned,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
