//! Cascade Sim - host harness for the cascade estimator
//!
//! Wraps `cascade_core` the way an external host would: it builds or loads
//! a network, hands it to the estimator with a seed set, and reports the
//! per-node activation probabilities.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      cascade-sim CLI                     │
//! │  ┌──────────────┐    ┌───────────────┐    ┌───────────┐  │
//! │  │   networks   │───►│ EstimateRunner│───►│  exporter │  │
//! │  │ catalog/file │    │ run / search  │    │   JSON    │  │
//! │  └──────────────┘    └───────┬───────┘    └───────────┘  │
//! │                              │                           │
//! │                      ┌───────▼───────┐                   │
//! │                      │  cascade_core │                   │
//! │                      │ rayon fan-out │                   │
//! │                      └───────────────┘                   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use cascade_sim::{EstimateRunner, NetworkId};
//! use cascade_env::SeedSet;
//!
//! let graph = NetworkId::Ring.build().unwrap();
//! let runner = EstimateRunner::new(42).with_threads(2).with_iterations(50);
//! let result = runner
//!     .run("ring", &graph, 1.0, &SeedSet::from_indices(&[0]))
//!     .unwrap();
//! assert_eq!(result.min_probability, 1.0);
//! ```

mod error;
mod exporter;
pub mod networks;
mod runner;

pub use error::SimError;
pub use exporter::EstimateExport;
pub use networks::{
    erdos_renyi, load_edge_list, parse_edge_list, resolve_network, EdgeListMode, NetworkId,
};
pub use runner::{sample_probes, EstimateRunner, RunResult};
