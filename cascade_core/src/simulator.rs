//! One stochastic Independent Cascade run.
//!
//! The cascade is a breadth-first propagation from the seed set. Every time
//! a node is expanded it gets exactly one Bernoulli(p) trial against each
//! still-inactive out-neighbour, scanned in ascending id order.

use crate::adjacency::AdjacencyMatrix;
use cascade_env::{CascadeError, RandomSource, Result, SeedSet};
use std::collections::VecDeque;

/// Per-node activation indicators of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationVector {
    active: Vec<bool>,
}

impl ActivationVector {
    /// Returns true if `node` ended the run active.
    pub fn is_active(&self, node: usize) -> bool {
        self.active[node]
    }

    /// Number of active nodes.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.active
    }
}

/// Activations plus bookkeeping about how the run unfolded.
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    /// Final activation state
    pub activations: ActivationVector,

    /// Random draws consumed
    pub draws: u64,

    /// Nodes popped off the frontier
    pub expansions: usize,
}

/// Runs cascades over a borrowed graph and seed set.
///
/// The simulator holds only shared references, so one instance can be used
/// from every worker of a pool at the same time; all mutable state of a run
/// lives on that run's stack.
#[derive(Debug, Clone, Copy)]
pub struct CascadeSimulator<'a> {
    graph: &'a AdjacencyMatrix,
    seeds: &'a SeedSet,
    probability: f64,
}

impl<'a> CascadeSimulator<'a> {
    /// Creates a simulator after checking `p ∈ [0, 1]` and the seeds.
    pub fn new(
        graph: &'a AdjacencyMatrix,
        seeds: &'a SeedSet,
        probability: f64,
    ) -> Result<Self> {
        check_probability(probability)?;
        seeds.validate(graph.node_count())?;
        Ok(Self {
            graph,
            seeds,
            probability,
        })
    }

    /// Activation probability applied to every edge.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Runs one cascade and returns its activation vector.
    pub fn run<R: RandomSource + ?Sized>(&self, rng: &mut R) -> ActivationVector {
        self.run_traced(rng).activations
    }

    /// Runs one cascade and also reports draws and expansions.
    ///
    /// A draw is taken only for an existing edge whose target is still
    /// inactive, and targets are scanned in ascending id order. Both rules fix
    /// the exact sequence of numbers consumed from `rng`.
    pub fn run_traced<R: RandomSource + ?Sized>(&self, rng: &mut R) -> CascadeOutcome {
        let n = self.graph.node_count();
        let mut active = vec![false; n];
        let mut frontier: VecDeque<usize> = VecDeque::with_capacity(n);

        for seed in self.seeds.iter() {
            active[seed.index()] = true;
            frontier.push_back(seed.index());
        }

        let mut draws = 0u64;
        let mut expansions = 0usize;

        while let Some(u) = frontier.pop_front() {
            expansions += 1;

            for (v, &edge) in self.graph.row(u).iter().enumerate() {
                if !edge || active[v] {
                    continue;
                }
                draws += 1;
                if rng.next_uniform() < self.probability {
                    active[v] = true;
                    frontier.push_back(v);
                }
            }
        }

        CascadeOutcome {
            activations: ActivationVector { active },
            draws,
            expansions,
        }
    }
}

/// Rejects NaN and values outside `[0, 1]`.
pub(crate) fn check_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(CascadeError::invalid(format!(
            "activation probability must be in [0, 1], got {}",
            p
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_env::{ChaChaSource, NodeId};
    use proptest::prelude::*;

    /// Replays a fixed list of draws, cycling when exhausted.
    struct Scripted {
        draws: Vec<f64>,
        pos: usize,
    }

    impl Scripted {
        fn new(draws: &[f64]) -> Self {
            Self {
                draws: draws.to_vec(),
                pos: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn reseed(&mut self, _iteration: u64) {
            self.pos = 0;
        }

        fn next_uniform(&mut self) -> f64 {
            let x = self.draws[self.pos % self.draws.len()];
            self.pos += 1;
            x
        }

        fn base_seed(&self) -> u64 {
            0
        }
    }

    fn chain(n: usize) -> AdjacencyMatrix {
        let edges: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        AdjacencyMatrix::from_edges(n, &edges).unwrap()
    }

    #[test]
    fn test_zero_probability_only_seeds() {
        let graph = chain(5);
        let seeds = SeedSet::from_indices(&[1]);
        let sim = CascadeSimulator::new(&graph, &seeds, 0.0).unwrap();

        let outcome = sim.run_traced(&mut ChaChaSource::new(7));
        assert_eq!(
            outcome.activations.as_slice(),
            &[false, true, false, false, false]
        );
        // The single 1 -> 2 trial was still drawn
        assert_eq!(outcome.draws, 1);
        assert_eq!(outcome.expansions, 1);
    }

    #[test]
    fn test_full_probability_reaches_closure() {
        // 0 -> 1 -> 2, 3 isolated, 4 -> 0
        let graph = AdjacencyMatrix::from_edges(5, &[(0, 1), (1, 2), (4, 0)]).unwrap();
        let seeds = SeedSet::from_indices(&[0]);
        let sim = CascadeSimulator::new(&graph, &seeds, 1.0).unwrap();

        let activations = sim.run(&mut ChaChaSource::new(1));
        assert_eq!(activations.as_slice(), &[true, true, true, false, false]);
    }

    #[test]
    fn test_draws_consumed_in_ascending_target_order() {
        // 0 -> 1, 0 -> 2
        let graph = AdjacencyMatrix::from_edges(3, &[(0, 2), (0, 1)]).unwrap();
        let seeds = SeedSet::from_indices(&[0]);
        let sim = CascadeSimulator::new(&graph, &seeds, 0.5).unwrap();

        let outcome = sim.run_traced(&mut Scripted::new(&[0.9, 0.1]));
        // 0.9 goes to node 1 (fails), 0.1 to node 2 (fires)
        assert_eq!(outcome.activations.as_slice(), &[true, false, true]);
        assert_eq!(outcome.draws, 2);
    }

    #[test]
    fn test_seeds_expanded_in_seed_order() {
        // 2 -> 1, 0 -> 3
        let graph = AdjacencyMatrix::from_edges(4, &[(2, 1), (0, 3)]).unwrap();
        let seeds = SeedSet::from_indices(&[2, 0]);
        let sim = CascadeSimulator::new(&graph, &seeds, 0.5).unwrap();

        let activations = sim.run(&mut Scripted::new(&[0.1, 0.9]));
        assert_eq!(activations.as_slice(), &[true, true, true, false]);
    }

    #[test]
    fn test_no_draw_for_active_targets() {
        let graph = AdjacencyMatrix::from_undirected_edges(2, &[(0, 1)]).unwrap();
        let seeds = SeedSet::from_indices(&[0, 1]);
        let sim = CascadeSimulator::new(&graph, &seeds, 0.5).unwrap();

        let outcome = sim.run_traced(&mut Scripted::new(&[0.0]));
        assert_eq!(outcome.draws, 0);
        assert_eq!(outcome.expansions, 2);
    }

    #[test]
    fn test_self_loop_is_noop() {
        let graph = AdjacencyMatrix::from_edges(2, &[(0, 0)]).unwrap();
        let seeds = SeedSet::from_indices(&[0]);
        let sim = CascadeSimulator::new(&graph, &seeds, 1.0).unwrap();

        let outcome = sim.run_traced(&mut ChaChaSource::new(3));
        assert_eq!(outcome.activations.as_slice(), &[true, false]);
        assert_eq!(outcome.draws, 0);
    }

    #[test]
    fn test_empty_seed_set_activates_nothing() {
        let graph = chain(4);
        let seeds = SeedSet::empty();
        let sim = CascadeSimulator::new(&graph, &seeds, 1.0).unwrap();

        let outcome = sim.run_traced(&mut ChaChaSource::new(3));
        assert_eq!(outcome.activations.active_count(), 0);
        assert_eq!(outcome.expansions, 0);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let graph = chain(3);
        let seeds = SeedSet::from_indices(&[0]);

        assert!(CascadeSimulator::new(&graph, &seeds, -0.1).is_err());
        assert!(CascadeSimulator::new(&graph, &seeds, 1.5).is_err());
        assert!(CascadeSimulator::new(&graph, &seeds, f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_seed() {
        let graph = chain(3);
        let seeds = SeedSet::from_indices(&[3]);
        let err = CascadeSimulator::new(&graph, &seeds, 0.5).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    fn graph_strategy() -> impl Strategy<Value = (usize, Vec<bool>)> {
        (1usize..12)
            .prop_flat_map(|n| (Just(n), proptest::collection::vec(any::<bool>(), n * n)))
    }

    proptest! {
        #[test]
        fn prop_every_active_node_expanded_once(
            (n, flat) in graph_strategy(),
            p in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let graph = AdjacencyMatrix::from_flat(n, &flat).unwrap();
            let seeds = SeedSet::from_indices(&[0]);
            let sim = CascadeSimulator::new(&graph, &seeds, p).unwrap();

            let outcome = sim.run_traced(&mut ChaChaSource::new(seed));
            prop_assert!(outcome.activations.is_active(0));
            prop_assert_eq!(outcome.expansions, outcome.activations.active_count());
            prop_assert!(outcome.expansions <= n);
            prop_assert!(outcome.draws <= (n * n) as u64);
        }

        #[test]
        fn prop_full_probability_matches_reachability(
            (n, flat) in graph_strategy(),
            seed in any::<u64>(),
        ) {
            let graph = AdjacencyMatrix::from_flat(n, &flat).unwrap();
            let seeds = SeedSet::from_indices(&[n - 1]);
            let sim = CascadeSimulator::new(&graph, &seeds, 1.0).unwrap();

            let activations = sim.run(&mut ChaChaSource::new(seed));
            let reach = graph.reachable_from(&[NodeId(n - 1)]);
            prop_assert_eq!(activations.as_slice(), reach.as_slice());
        }
    }
}
