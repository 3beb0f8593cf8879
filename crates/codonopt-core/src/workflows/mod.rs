//! # Workflows Module
//!
//! The public entry points of the library.
//!
//! - **Constraint Builder** ([`constraints`]) - turns patterns, motifs, GC bounds and stop
//!   positions into engine constraints
//! - **Profiles** ([`profiles`]) - the bacterial and eukaryotic recipes
//! - **Design** ([`design`]) - reverse translation, engine invocation and the single
//!   relaxation retry of the bacterial profile
//! - **Verification** ([`verify`]) - independent checks of designed sequences

pub mod constraints;
pub mod design;
pub mod profiles;
pub mod verify;
