use super::config::ConfigError;
use crate::core::codon_usage::CodonUsageError;
use crate::core::models::sequence::{Location, SequenceError};
use crate::core::patterns::PatternError;
use crate::core::translation::TranslationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid DNA sequence: {0}")]
    InvalidSequence(#[from] SequenceError),

    #[error("DNA length {0} is not a multiple of 3")]
    FrameLength(usize),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Codon usage table error: {0}")]
    CodonUsage(#[from] CodonUsageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No solution: constraint {constraint} cannot be satisfied at {location}")]
    NoSolution {
        constraint: String,
        location: Location,
    },

    #[error("Constraint resolution did not converge after {iterations} iterations")]
    Convergence { iterations: usize },

    #[error("Optimized sequence still breaches {breaches} constraint(s)")]
    Unresolved { breaches: usize },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Whether the engine gave up because the constraints could not all be satisfied, as
    /// opposed to failing on bad input.
    pub fn is_no_solution(&self) -> bool {
        matches!(
            self,
            EngineError::NoSolution { .. } | EngineError::Convergence { .. }
        )
    }
}
