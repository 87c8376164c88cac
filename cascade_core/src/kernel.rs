//! Flat-array entry point for hosts that hold plain buffers.
//!
//! The host passes sizes as signed integers, the graph as an n×n row-major
//! 0/1 array, and a preallocated output buffer. Every argument is checked
//! here before anything is allocated or simulated; a rejected call leaves
//! `result` untouched.

use crate::adjacency::AdjacencyMatrix;
use crate::estimator::{estimate_seeds, EstimatorConfig};
use cascade_env::{CascadeError, NodeId, Result, SeedSet};
use tracing::debug;

/// Options the flat signature has no room for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelOptions {
    /// Base seed for the per-iteration streams
    pub base_seed: u64,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self { base_seed: 42 }
    }
}

/// Estimates activation probabilities and writes them into `result`.
///
/// # Arguments
/// * `threads` - Worker threads, `> 0`
/// * `p` - Edge activation probability in `[0, 1]`
/// * `n` - Node count, `> 0`
/// * `iters` - Monte Carlo iterations, `> 0`
/// * `len_ss` - Number of seeds, must equal `ss.len()`
/// * `adj1d` - `n * n` row-major adjacency, nonzero = edge
/// * `ss` - Seed ids, each in `[0, n)`, no repeats
/// * `result` - Output buffer of length `n`
///
/// # Returns
/// * `Ok(())` - `result[i]` holds node `i`'s activation probability
/// * `Err(CascadeError::InvalidArgument)` - Nothing was written
#[allow(clippy::too_many_arguments)]
pub fn estimate(
    threads: i32,
    p: f32,
    n: i32,
    iters: i32,
    len_ss: i32,
    adj1d: &[i32],
    ss: &[i32],
    result: &mut [f32],
    options: &KernelOptions,
) -> Result<()> {
    if n <= 0 {
        return Err(CascadeError::invalid(format!("n must be positive, got {}", n)));
    }
    if iters <= 0 {
        return Err(CascadeError::invalid(format!(
            "iteration count must be positive, got {}",
            iters
        )));
    }
    if threads <= 0 {
        return Err(CascadeError::invalid(format!(
            "thread count must be positive, got {}",
            threads
        )));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(CascadeError::invalid(format!(
            "activation probability must be in [0, 1], got {}",
            p
        )));
    }
    if len_ss < 0 || len_ss as usize != ss.len() {
        return Err(CascadeError::invalid(format!(
            "len_ss={} does not match {} seed ids",
            len_ss,
            ss.len()
        )));
    }

    let n = n as usize;
    if result.len() != n {
        return Err(CascadeError::invalid(format!(
            "result buffer has length {}, expected {}",
            result.len(),
            n
        )));
    }

    let graph = AdjacencyMatrix::from_flat_ints(n, adj1d)?;
    let seeds = ss
        .iter()
        .map(|&raw| NodeId::from_signed(i64::from(raw), n))
        .collect::<Result<SeedSet>>()?;

    let config = EstimatorConfig {
        threads: threads as usize,
        iterations: iters as usize,
        probability: f64::from(p),
        base_seed: options.base_seed,
    };

    debug!(
        "Flat estimate: n={} edges={} seeds={} iters={} threads={}",
        n,
        graph.edge_count(),
        seeds.len(),
        config.iterations,
        config.threads
    );

    let probabilities = estimate_seeds(&graph, &seeds, &config)?;
    for (slot, &prob) in result.iter_mut().zip(probabilities.as_slice()) {
        *slot = prob as f32;
    }
    Ok(())
}
