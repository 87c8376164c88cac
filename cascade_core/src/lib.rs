//! Cascade Core - Monte Carlo estimation under the Independent Cascade model
//!
//! Given a directed graph, one activation probability `p` shared by every
//! edge, and a seed set, this crate estimates for every node the probability
//! that it ends up active:
//! 1. **AdjacencyMatrix**: immutable dense edge lookup, shared by all workers
//! 2. **CascadeSimulator**: one breadth-first stochastic propagation
//! 3. **Estimator**: parallel fan-out of independent runs, integer reduction,
//!    normalization
//!
//! # Example
//!
//! ```
//! use cascade_core::{AdjacencyMatrix, Estimator, EstimatorConfig};
//! use cascade_env::SeedSet;
//!
//! let graph = AdjacencyMatrix::from_edges(2, &[(0, 1)]).unwrap();
//! let estimator = Estimator::new(graph, SeedSet::from_indices(&[0])).unwrap();
//!
//! let config = EstimatorConfig::default()
//!     .with_probability(1.0)
//!     .with_iterations(10);
//! let result = estimator.estimate(&config).unwrap();
//! assert_eq!(result.as_slice(), &[1.0, 1.0]);
//! ```

pub mod adjacency;
pub mod estimator;
pub mod kernel;
pub mod simulator;
pub mod spread;

// Re-export key types for convenience
pub use adjacency::AdjacencyMatrix;
pub use estimator::{estimate_seeds, AggregateCounts, Estimator, EstimatorConfig, ResultVector};
pub use kernel::KernelOptions;
pub use simulator::{ActivationVector, CascadeOutcome, CascadeSimulator};
pub use spread::{SpreadabilityLevels, SpreadabilitySearch};
