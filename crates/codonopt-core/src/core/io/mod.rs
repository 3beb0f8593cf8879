//! Tabular input/output for batches of designed sequences.
//!
//! Records are read from CSV tables whose column names are configurable, and verification
//! reports are written back as CSV with one row per detected problem.

pub mod records;
