//! # Core Models Module
//!
//! Value types shared by every layer of the crate: nucleotide triplets ([`sequence::Codon`]),
//! half-open base ranges ([`sequence::Location`]) and the small set of nucleotide helpers
//! (reverse complement, GC counting, normalization) the constraints are written against.

pub mod sequence;
