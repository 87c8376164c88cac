//! Cascade Environment Layer
//!
//! This crate holds the pieces every other crate in the workspace agrees on:
//! node identifiers, seed sets, the error taxonomy, and the seeded random
//! streams that drive each simulation.
//!
//! # Core Concept: Reproducible Randomness
//!
//! Every draw a cascade consumes comes from a stream derived from a single
//! 64-bit base seed and the iteration index:
//!
//! ```text
//! seed(iteration) = base * 0x9e3779b97f4a7c15 + iteration * 0x517cc1b727220a95
//! ```
//!
//! so any estimate can be replayed bit for bit from its base seed, no matter
//! how many worker threads produced it.
//!
//! # Example
//!
//! ```
//! use cascade_env::{ChaChaSource, RandomSource};
//!
//! let mut a = ChaChaSource::for_iteration(42, 3);
//! let mut b = ChaChaSource::new(42);
//! b.reseed(3);
//! assert_eq!(a.next_uniform(), b.next_uniform());
//! ```

mod error;
mod random;
mod types;

pub use error::{CascadeError, Result};
pub use random::{derive_seed, ChaChaSource, RandomSource};
pub use types::{NodeId, SeedSet};
