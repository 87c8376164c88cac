//! Parallel Monte Carlo estimation of activation probabilities.
//!
//! `iterations` independent cascades are fanned out over a rayon pool of
//! `threads` workers. Each task owns its random stream and its activation
//! vector; workers fold activations into private integer counts which are
//! then reduced into one [`AggregateCounts`]. Integer addition is
//! associative and commutative, so the result does not depend on how rayon
//! schedules or splits the work.
//!
//! ```text
//!   iteration 0 ──► ChaChaSource(base, 0) ──► cascade ──┐
//!   iteration 1 ──► ChaChaSource(base, 1) ──► cascade ──┤ fold  ┌────────┐
//!        ...                                            ├──────►│ counts │──► / iterations
//!   iteration k ──► ChaChaSource(base, k) ──► cascade ──┘reduce └────────┘
//! ```

use crate::adjacency::AdjacencyMatrix;
use crate::simulator::{check_probability, ActivationVector, CascadeSimulator};
use cascade_env::{CascadeError, ChaChaSource, Result, SeedSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::debug;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Parameters of one estimation call.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Worker threads in the pool
    pub threads: usize,

    /// Independent cascades to run
    pub iterations: usize,

    /// Edge activation probability
    pub probability: f64,

    /// Base seed every iteration's stream is derived from
    pub base_seed: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4),
            iterations: 1000,
            probability: 0.5,
            base_seed: 42,
        }
    }
}

impl EstimatorConfig {
    /// Sets the worker count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the iteration count.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the activation probability.
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    /// Checks threads, iterations and probability.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(CascadeError::invalid("thread count must be positive"));
        }
        if self.iterations == 0 {
            return Err(CascadeError::invalid("iteration count must be positive"));
        }
        check_probability(self.probability)
    }
}

// =============================================================================
// AGGREGATION
// =============================================================================

/// Per-node activation totals across iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCounts {
    counts: Vec<u64>,
}

impl AggregateCounts {
    pub fn zeros(n: usize) -> Self {
        Self { counts: vec![0; n] }
    }

    /// Adds one run's indicators.
    pub fn accumulate(&mut self, activations: &ActivationVector) {
        for (count, &active) in self.counts.iter_mut().zip(activations.as_slice()) {
            *count += u64::from(active);
        }
    }

    /// Element-wise sum of two partial totals.
    pub fn merge(mut self, other: Self) -> Self {
        for (count, extra) in self.counts.iter_mut().zip(other.counts) {
            *count += extra;
        }
        self
    }

    /// Divides every count by `iterations`.
    pub fn normalize(&self, iterations: usize) -> ResultVector {
        let denom = iterations as f64;
        ResultVector {
            probabilities: self.counts.iter().map(|&c| c as f64 / denom).collect(),
        }
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.counts
    }
}

/// Estimated activation probability of every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultVector {
    probabilities: Vec<f64>,
}

impl ResultVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.probabilities
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn get(&self, node: usize) -> Option<f64> {
        self.probabilities.get(node).copied()
    }

    /// Probability of the least-reached node.
    pub fn min_probability(&self) -> f64 {
        self.probabilities.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Expected number of active nodes at the end of a cascade.
    pub fn expected_spread(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Expected fraction of the network reached.
    pub fn mean_probability(&self) -> f64 {
        if self.probabilities.is_empty() {
            return 0.0;
        }
        self.expected_spread() / self.probabilities.len() as f64
    }
}

// =============================================================================
// ESTIMATOR
// =============================================================================

/// Owns a graph and a seed set, and estimates activation probabilities.
#[derive(Debug, Clone)]
pub struct Estimator {
    graph: AdjacencyMatrix,
    seeds: SeedSet,
}

impl Estimator {
    /// Creates an estimator, rejecting seeds that don't fit the graph.
    pub fn new(graph: AdjacencyMatrix, seeds: SeedSet) -> Result<Self> {
        seeds.validate(graph.node_count())?;
        Ok(Self { graph, seeds })
    }

    pub fn graph(&self) -> &AdjacencyMatrix {
        &self.graph
    }

    pub fn seeds(&self) -> &SeedSet {
        &self.seeds
    }

    /// Runs `config.iterations` cascades and returns per-node probabilities.
    pub fn estimate(&self, config: &EstimatorConfig) -> Result<ResultVector> {
        estimate_seeds(&self.graph, &self.seeds, config)
    }

    /// Replays a single iteration of an estimate.
    ///
    /// Iteration `i` of [`Estimator::estimate`] with the same probability and
    /// base seed produces exactly this vector.
    pub fn simulate_iteration(
        &self,
        probability: f64,
        base_seed: u64,
        iteration: u64,
    ) -> Result<ActivationVector> {
        let simulator = CascadeSimulator::new(&self.graph, &self.seeds, probability)?;
        let mut rng = ChaChaSource::for_iteration(base_seed, iteration);
        Ok(simulator.run(&mut rng))
    }
}

/// Estimates activation probabilities for an arbitrary seed set on `graph`.
///
/// Every argument is validated before the pool is built.
pub fn estimate_seeds(
    graph: &AdjacencyMatrix,
    seeds: &SeedSet,
    config: &EstimatorConfig,
) -> Result<ResultVector> {
    config.validate()?;
    let simulator = CascadeSimulator::new(graph, seeds, config.probability)?;
    let counts = aggregate(&simulator, graph.node_count(), config)?;
    Ok(counts.normalize(config.iterations))
}

fn aggregate(
    simulator: &CascadeSimulator<'_>,
    n: usize,
    config: &EstimatorConfig,
) -> Result<AggregateCounts> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("cascade-worker-{}", i))
        .build()
        .map_err(CascadeError::thread_pool)?;

    let start = Instant::now();
    let base_seed = config.base_seed;

    // `install` returns only after every task has finished
    let counts = pool.install(|| {
        (0..config.iterations)
            .into_par_iter()
            .fold(
                || AggregateCounts::zeros(n),
                |mut acc, iteration| {
                    let mut rng = ChaChaSource::for_iteration(base_seed, iteration as u64);
                    acc.accumulate(&simulator.run(&mut rng));
                    acc
                },
            )
            .reduce(|| AggregateCounts::zeros(n), AggregateCounts::merge)
    });

    debug!(
        "Estimated {} iterations over {} nodes on {} threads in {:.3}ms (p={}, seed={})",
        config.iterations,
        n,
        config.threads,
        start.elapsed().as_secs_f64() * 1000.0,
        simulator.probability(),
        base_seed
    );

    Ok(counts)
}
