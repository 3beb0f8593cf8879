//! # Core Module
//!
//! Stateless building blocks for codon optimization: the data every other layer is written
//! against, with no search state of its own.
//!
//! ## Architecture
//!
//! - **Sequence Primitives** ([`models`]) - Codons, locations and nucleotide helpers
//! - **Genetic Code** ([`genetic_code`]) - The standard code and the reassigned-stop convention
//! - **Codon Usage** ([`codon_usage`]) - Bundled relative codon frequencies for E. coli and human
//! - **Sequence Patterns** ([`patterns`]) - Enzyme sites, homopolymers, literals and regexes
//! - **Translation** ([`translation`]) - Reverse translation of proteins into seed DNA
//! - **Record I/O** ([`io`]) - CSV batches of designed sequences and verification reports

pub mod codon_usage;
pub mod genetic_code;
pub mod io;
pub mod models;
pub mod patterns;
pub mod translation;
