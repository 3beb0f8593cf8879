//! # Engine Module
//!
//! The stateful optimization layer. It turns a seed DNA sequence, a list of hard
//! [`constraint::Constraint`]s and a list of soft [`objective::Objective`]s into an
//! [`problem::DnaOptimizationProblem`], and solves it with an [`search::OptimizationEngine`].
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - design profiles, search parameters and built-in defaults
//! - **Specifications** ([`constraint`], [`objective`]) - what a sequence must and should satisfy
//! - **Search** ([`mutation`], [`problem`], [`search`]) - the allowed codons per position and
//!   the breach-driven local search over them
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Error Handling** ([`error`]) - engine errors, including the no-solution outcome

pub mod config;
pub mod constraint;
pub mod error;
pub mod mutation;
pub mod objective;
pub mod problem;
pub mod progress;
pub mod search;
