//! Estimate runner - drives the estimator the way a host would.

use crate::error::SimError;
use cascade_core::spread::{evaluate_prefixes, search_spreadability};
use cascade_core::{estimate_seeds, AdjacencyMatrix, EstimatorConfig, SpreadabilitySearch};
use cascade_env::{CascadeError, NodeId, SeedSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Results from one estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Network label (catalog name or file path)
    pub network: String,

    /// Nodes in the network
    pub node_count: usize,

    /// Directed edges in the network
    pub edge_count: usize,

    /// Edge activation probability
    pub probability: f64,

    /// Monte Carlo iterations
    pub iterations: usize,

    /// Worker threads
    pub threads: usize,

    /// Base seed used
    pub seed: u64,

    /// Seed set, in order
    pub seeds: Vec<usize>,

    /// Per-node activation probabilities
    pub probabilities: Vec<f64>,

    /// Probability of the least-reached node
    pub min_probability: f64,

    /// Expected number of active nodes
    pub expected_spread: f64,

    /// Wall time of the estimate
    pub elapsed_ms: f64,
}

/// Draws `count` probe nodes uniformly from `0..n`, with replacement.
pub fn sample_probes(n: usize, count: usize, seed: u64) -> Result<Vec<NodeId>, SimError> {
    if n == 0 || count == 0 {
        return Err(CascadeError::invalid(format!(
            "cannot sample {} probes from {} nodes",
            count, n
        ))
        .into());
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let nodes = Uniform::new(0, n);
    Ok((0..count).map(|_| NodeId::new(nodes.sample(&mut rng))).collect())
}

/// Runs estimates with a fixed seed, pool size and iteration count.
pub struct EstimateRunner {
    /// Base seed
    seed: u64,

    /// Worker threads
    threads: usize,

    /// Iterations per estimate
    iterations: usize,
}

impl EstimateRunner {
    /// Creates a new runner with default pool size and iteration count.
    pub fn new(seed: u64) -> Self {
        let defaults = EstimatorConfig::default();
        Self {
            seed,
            threads: defaults.threads,
            iterations: defaults.iterations,
        }
    }

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

    /// Estimator configuration for probability `p`.
    pub fn config(&self, p: f64) -> EstimatorConfig {
        EstimatorConfig {
            threads: self.threads,
            iterations: self.iterations,
            probability: p,
            base_seed: self.seed,
        }
    }

    /// Estimates activation probabilities of `seeds` on `graph`.
    pub fn run(
        &self,
        network: &str,
        graph: &AdjacencyMatrix,
        p: f64,
        seeds: &SeedSet,
    ) -> Result<RunResult, SimError> {
        info!(
            "Estimating {} (n={}, edges={}, p={}, seeds={}, seed={})",
            network,
            graph.node_count(),
            graph.edge_count(),
            p,
            seeds.len(),
            self.seed
        );

        let config = self.config(p);
        let start = Instant::now();
        let result = estimate_seeds(graph, seeds, &config)?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        debug!(
            "  min={:.4} spread={:.2} in {:.1}ms",
            result.min_probability(),
            result.expected_spread(),
            elapsed_ms
        );

        Ok(RunResult {
            network: network.to_string(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            probability: p,
            iterations: config.iterations,
            threads: config.threads,
            seed: self.seed,
            seeds: seeds.iter().map(|s| s.index()).collect(),
            min_probability: result.min_probability(),
            expected_spread: result.expected_spread(),
            probabilities: result.into_vec(),
            elapsed_ms,
        })
    }

    /// Minimum activation probability of every seed prefix.
    pub fn run_prefixes(
        &self,
        graph: &AdjacencyMatrix,
        p: f64,
        seeds: &SeedSet,
    ) -> Result<Vec<f64>, SimError> {
        let minimums = evaluate_prefixes(graph, seeds, &self.config(p))?;
        for (k, min) in minimums.iter().enumerate() {
            debug!("  prefix {} -> min {:.4}", k + 1, min);
        }
        Ok(minimums)
    }

    /// Scans p for low / medium / high spreadability.
    pub fn run_search(
        &self,
        graph: &AdjacencyMatrix,
        probes: &[NodeId],
    ) -> Result<SpreadabilitySearch, SimError> {
        info!(
            "Searching spreadability levels with {} probe seeds, {} iterations each",
            probes.len(),
            self.iterations
        );
        let start = Instant::now();
        // Probability is overridden per grid point
        let search = search_spreadability(graph, probes, &self.config(0.0))?;
        info!(
            "✓ Levels: low={:.2} med={:.2} high={:.2} ({:.2}s)",
            search.levels.low,
            search.levels.med,
            search.levels.high,
            start.elapsed().as_secs_f64()
        );
        Ok(search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::NetworkId;

    #[test]
    fn test_run_star_from_hub() {
        let graph = NetworkId::Star.build().unwrap();
        let runner = EstimateRunner::new(42).with_threads(2).with_iterations(100);

        let result = runner
            .run("star", &graph, 1.0, &SeedSet::from_indices(&[0]))
            .unwrap();

        assert_eq!(result.node_count, 7);
        assert_eq!(result.probabilities, vec![1.0; 7]);
        assert_eq!(result.min_probability, 1.0);
        assert_eq!(result.expected_spread, 7.0);
        assert_eq!(result.seeds, vec![0]);
    }

    #[test]
    fn test_run_deterministic() {
        let graph = NetworkId::Tree.build().unwrap();
        let seeds = SeedSet::from_indices(&[4]);

        let a = EstimateRunner::new(7).with_threads(1).with_iterations(300);
        let b = EstimateRunner::new(7).with_threads(3).with_iterations(300);

        let ra = a.run("tree", &graph, 0.5, &seeds).unwrap();
        let rb = b.run("tree", &graph, 0.5, &seeds).unwrap();
        assert_eq!(ra.probabilities, rb.probabilities);
    }

    #[test]
    fn test_run_rejects_bad_seed() {
        let graph = NetworkId::Triangle.build().unwrap();
        let runner = EstimateRunner::new(1).with_iterations(10);

        let err = runner
            .run("triangle", &graph, 0.5, &SeedSet::from_indices(&[3]))
            .unwrap_err();
        assert!(matches!(err, SimError::Cascade(_)));
    }

    #[test]
    fn test_run_prefixes_on_chain() {
        let graph = NetworkId::Chain.build().unwrap();
        let runner = EstimateRunner::new(1).with_threads(2).with_iterations(10);

        let mins = runner
            .run_prefixes(&graph, 1.0, &SeedSet::from_indices(&[0, 9]))
            .unwrap();
        assert_eq!(mins, vec![1.0, 1.0]);
    }

    #[test]
    fn test_sample_probes_deterministic_and_in_range() {
        let a = sample_probes(7, 500, 42).unwrap();
        let b = sample_probes(7, 500, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 500);
        assert!(a.iter().all(|node| node.index() < 7));

        // With replacement: 500 draws over 7 nodes must repeat and cover
        let mut seen = [false; 7];
        for node in &a {
            seen[node.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));

        assert_ne!(a, sample_probes(7, 500, 43).unwrap());
    }

    #[test]
    fn test_sample_probes_rejects_empty() {
        assert!(sample_probes(0, 10, 1).is_err());
        assert!(sample_probes(5, 0, 1).is_err());
    }

    #[test]
    fn test_run_search_with_sampled_probes() {
        let graph = NetworkId::Star.build().unwrap();
        let probes = sample_probes(graph.node_count(), 50, 3).unwrap();
        let runner = EstimateRunner::new(3).with_threads(2).with_iterations(1);

        let search = runner.run_search(&graph, &probes).unwrap();
        assert_eq!(search.curve.len(), 99);
        assert!(search.levels.low <= search.levels.med);
        assert!(search.levels.med <= search.levels.high);
    }

    #[test]
    fn test_run_chain_converges() {
        let graph = NetworkId::Chain.build().unwrap();
        let runner = EstimateRunner::new(11).with_threads(4).with_iterations(20_000);

        let result = runner
            .run("chain", &graph, 0.5, &SeedSet::from_indices(&[0]))
            .unwrap();

        // Node k is reached with probability p^k
        approx::assert_abs_diff_eq!(result.probabilities[1], 0.5, epsilon = 0.02);
        approx::assert_abs_diff_eq!(result.probabilities[2], 0.25, epsilon = 0.02);
        approx::assert_abs_diff_eq!(result.probabilities[3], 0.125, epsilon = 0.02);
    }
}
