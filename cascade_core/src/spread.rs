//! Spread analysis built on top of the estimator.
//!
//! Influence-maximization hosts rarely look at the raw probability vector;
//! they ask how well the least-reached node is covered as seeds are added,
//! and which activation probabilities make a network "hard", "medium" or
//! "easy" to spread through. Both questions are answered here.

use crate::adjacency::AdjacencyMatrix;
use crate::estimator::{estimate_seeds, EstimatorConfig};
use cascade_env::{derive_seed, CascadeError, NodeId, Result, SeedSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Spreadability below which a probability counts as "low".
pub const LOW_SPREAD: f64 = 0.2;

/// Spreadability below which a probability counts as "medium".
pub const MED_SPREAD: f64 = 0.5;

/// Spreadability below which a probability counts as "high".
pub const HIGH_SPREAD: f64 = 0.8;

/// Probabilities scanned by [`search_spreadability`]: 0.01, 0.02, ..., 0.99.
pub fn probability_grid() -> Vec<f64> {
    (1..=99).map(|k| k as f64 / 100.0).collect()
}

/// Minimum activation probability of each seed prefix.
///
/// Entry `k - 1` is `min_i P(node i active | seeds[..k])`.
pub fn evaluate_prefixes(
    graph: &AdjacencyMatrix,
    seeds: &SeedSet,
    config: &EstimatorConfig,
) -> Result<Vec<f64>> {
    config.validate()?;
    seeds.validate(graph.node_count())?;

    (1..=seeds.len())
        .map(|k| {
            estimate_seeds(graph, &seeds.prefix(k), config)
                .map(|result| result.min_probability())
        })
        .collect()
}

/// Mean fraction of the network reached from a single probe seed.
///
/// Each probe seed runs its own single-seed estimate at `config.probability`.
/// Probe `i` uses base seed `derive_seed(config.base_seed, i)`, so repeated
/// probes of the same node still draw from distinct streams.
pub fn spreadability(
    graph: &AdjacencyMatrix,
    probe_seeds: &[NodeId],
    config: &EstimatorConfig,
) -> Result<f64> {
    if probe_seeds.is_empty() {
        return Err(CascadeError::invalid("spreadability needs at least one probe seed"));
    }

    let mut total = 0.0;
    for (i, &probe) in probe_seeds.iter().enumerate() {
        let seeds = SeedSet::new(vec![probe]);
        let cfg = config.clone().with_seed(derive_seed(config.base_seed, i as u64));
        total += estimate_seeds(graph, &seeds, &cfg)?.mean_probability();
    }
    Ok(total / probe_seeds.len() as f64)
}

/// Probabilities giving low, medium and high spreadability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadabilityLevels {
    pub low: f64,
    pub med: f64,
    pub high: f64,
}

/// Full result of a spreadability scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadabilitySearch {
    /// Selected probabilities
    pub levels: SpreadabilityLevels,

    /// `(p, spreadability)` for every grid point
    pub curve: Vec<(f64, f64)>,
}

/// Scans [`probability_grid`] and picks low / medium / high probabilities.
///
/// `low` and `med` are the largest grid values whose spreadability is still
/// under [`LOW_SPREAD`] / [`MED_SPREAD`]. `high` is the first grid value at
/// or above [`HIGH_SPREAD`], i.e. one step past the last value under it.
/// Unset levels fall back to the first, middle and last grid values.
///
/// `config.probability` is ignored; every other field applies to each grid
/// point.
pub fn search_spreadability(
    graph: &AdjacencyMatrix,
    probe_seeds: &[NodeId],
    config: &EstimatorConfig,
) -> Result<SpreadabilitySearch> {
    let grid = probability_grid();

    let curve = grid
        .iter()
        .map(|&p| {
            let cfg = config.clone().with_probability(p);
            spreadability(graph, probe_seeds, &cfg).map(|s| (p, s))
        })
        .collect::<Result<Vec<_>>>()?;

    let levels = select_levels(&grid, &curve);
    debug!(
        "Spreadability levels: low={:.2} med={:.2} high={:.2}",
        levels.low, levels.med, levels.high
    );

    Ok(SpreadabilitySearch { levels, curve })
}

fn select_levels(grid: &[f64], curve: &[(f64, f64)]) -> SpreadabilityLevels {
    let mut low = None;
    let mut med = None;
    let mut high_idx = None;

    for (i, &(p, spread)) in curve.iter().enumerate() {
        if spread < LOW_SPREAD {
            low = Some(p);
        }
        if spread < MED_SPREAD {
            med = Some(p);
        }
        if spread < HIGH_SPREAD {
            high_idx = Some(i);
        }
    }

    let last = grid.len() - 1;
    let high = match high_idx {
        Some(i) if i < last => grid[i + 1],
        _ => grid[last],
    };

    SpreadabilityLevels {
        low: low.unwrap_or(grid[0]),
        med: med.unwrap_or(grid[grid.len() / 2]),
        high,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(iterations: usize) -> EstimatorConfig {
        EstimatorConfig::default()
            .with_threads(2)
            .with_iterations(iterations)
            .with_seed(7)
    }

    #[test]
    fn test_grid_bounds() {
        let grid = probability_grid();
        assert_eq!(grid.len(), 99);
        assert_relative_eq!(grid[0], 0.01);
        assert_relative_eq!(grid[49], 0.50);
        assert_relative_eq!(grid[98], 0.99);
    }

    #[test]
    fn test_prefixes_at_zero_probability() {
        let graph = AdjacencyMatrix::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let seeds = SeedSet::from_indices(&[0, 1, 2]);

        let mins = evaluate_prefixes(&graph, &seeds, &config(20).with_probability(0.0)).unwrap();
        assert_eq!(mins, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_prefixes_at_full_probability() {
        let graph = AdjacencyMatrix::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let seeds = SeedSet::from_indices(&[2, 0]);

        let mins = evaluate_prefixes(&graph, &seeds, &config(20).with_probability(1.0)).unwrap();
        assert_eq!(mins, vec![0.0, 1.0]);
    }

    #[test]
    fn test_prefixes_of_empty_seed_set() {
        let graph = AdjacencyMatrix::from_edges(2, &[(0, 1)]).unwrap();
        let mins = evaluate_prefixes(&graph, &SeedSet::empty(), &config(10)).unwrap();
        assert!(mins.is_empty());
    }

    #[test]
    fn test_spreadability_requires_probe() {
        let graph = AdjacencyMatrix::from_edges(2, &[(0, 1)]).unwrap();
        assert!(spreadability(&graph, &[], &config(10)).is_err());
    }

    #[test]
    fn test_spreadability_of_isolated_nodes() {
        let graph = AdjacencyMatrix::from_edges(4, &[]).unwrap();
        let s = spreadability(&graph, &[NodeId(0), NodeId(3)], &config(10)).unwrap();
        assert_relative_eq!(s, 0.25);
    }

    #[test]
    fn test_repeated_probes_draw_distinct_streams() {
        // 0 -> 1 at p = 0.5 with one iteration per probe: a shared stream would
        // make every probe agree, giving spreadability exactly 0.5 or 1.0
        let graph = AdjacencyMatrix::from_edges(2, &[(0, 1)]).unwrap();
        let probes = vec![NodeId(0); 200];
        let cfg = config(1).with_probability(0.5);

        let s = spreadability(&graph, &probes, &cfg).unwrap();
        assert!(s > 0.6 && s < 0.9, "spreadability {} not near 0.75", s);
    }

    #[test]
    fn test_search_single_node_uses_fallbacks() {
        // Spreadability is always 1.0, never under any threshold
        let graph = AdjacencyMatrix::from_edges(1, &[]).unwrap();
        let search = search_spreadability(&graph, &[NodeId(0)], &config(4)).unwrap();

        assert_eq!(search.curve.len(), 99);
        assert_relative_eq!(search.levels.low, 0.01);
        assert_relative_eq!(search.levels.med, 0.50);
        assert_relative_eq!(search.levels.high, 0.99);
    }

    #[test]
    fn test_search_edgeless_graph_saturates() {
        // Spreadability is always 0.1, under every threshold
        let graph = AdjacencyMatrix::from_edges(10, &[]).unwrap();
        let search = search_spreadability(&graph, &[NodeId(5)], &config(4)).unwrap();

        assert_relative_eq!(search.levels.low, 0.99);
        assert_relative_eq!(search.levels.med, 0.99);
        assert_relative_eq!(search.levels.high, 0.99);
    }

    #[test]
    fn test_search_two_node_high_level() {
        // Spreadability is (1 + p) / 2, which crosses 0.8 at p = 0.6
        let graph = AdjacencyMatrix::from_edges(2, &[(0, 1)]).unwrap();
        let search = search_spreadability(&graph, &[NodeId(0)], &config(4000)).unwrap();

        assert_relative_eq!(search.levels.low, 0.01);
        assert_relative_eq!(search.levels.med, 0.50);
        assert!(
            (0.55..=0.66).contains(&search.levels.high),
            "high level {} not near 0.6",
            search.levels.high
        );
    }

    #[test]
    fn test_select_levels_advances_high_by_one_step() {
        let grid = probability_grid();
        let curve: Vec<(f64, f64)> = grid.iter().map(|&p| (p, p)).collect();
        let levels = select_levels(&grid, &curve);

        // Last p with p < 0.2 is 0.19; with p < 0.8 is 0.79, advanced to 0.80
        assert_relative_eq!(levels.low, 0.19);
        assert_relative_eq!(levels.med, 0.49);
        assert_relative_eq!(levels.high, 0.80);
    }
}
