//! # codonopt
//!
//! Codon optimization: design a DNA sequence that encodes a given protein, meets synthesis
//! and expression constraints, and favours the codon usage of a host organism. A separate
//! verification suite checks designed sequences independently of how they were produced.
//!
//! The library has three layers:
//!
//! - **[`core`]**: stateless data and algorithms: codons, the genetic code, codon-usage
//!   tables, sequence patterns, translation and CSV record I/O.
//!
//! - **[`engine`]**: constraint and objective specifications, the optimization problem and
//!   the local-search engine that solves it, plus configuration, progress reporting and errors.
//!
//! - **[`workflows`]**: the user-facing procedures: building constraint sets, running a design
//!   with its relaxation retry, and verifying batches of records.

pub mod core;
pub mod engine;
pub mod workflows;
