//! Dense directed adjacency storage.
//!
//! The matrix is built once and never mutated afterwards, which is what lets
//! every worker in the estimator read it without locks.

use cascade_env::{CascadeError, NodeId, Result};

/// Read-only n×n directed adjacency matrix.
///
/// Rows are stored back to back in a single buffer: edge `u → v` lives at
/// `u * n + v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    n: usize,
    cells: Vec<bool>,
}

impl AdjacencyMatrix {
    /// Builds a matrix from a row-major flattened boolean array.
    pub fn from_flat(n: usize, flat: &[bool]) -> Result<Self> {
        Self::check_len(n, flat.len())?;
        Ok(Self {
            n,
            cells: flat.to_vec(),
        })
    }

    /// Builds a matrix from a row-major flattened 0/1 integer array.
    ///
    /// Any nonzero cell is an edge.
    pub fn from_flat_ints(n: usize, flat: &[i32]) -> Result<Self> {
        Self::check_len(n, flat.len())?;
        Ok(Self {
            n,
            cells: flat.iter().map(|&cell| cell != 0).collect(),
        })
    }

    /// Builds a matrix from directed `(source, target)` pairs.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut cells = vec![false; Self::cell_count(n)?];
        for &(u, v) in edges {
            Self::check_endpoint(n, u)?;
            Self::check_endpoint(n, v)?;
            cells[u * n + v] = true;
        }
        Ok(Self { n, cells })
    }

    /// Builds a symmetric matrix: every pair becomes edges in both directions.
    pub fn from_undirected_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut cells = vec![false; Self::cell_count(n)?];
        for &(u, v) in edges {
            Self::check_endpoint(n, u)?;
            Self::check_endpoint(n, v)?;
            cells[u * n + v] = true;
            cells[v * n + u] = true;
        }
        Ok(Self { n, cells })
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Number of directed edges, self-loops included.
    pub fn edge_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Returns true if `u → v` exists. Panics if either index is `>= n`.
    #[inline]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        debug_assert!(u < self.n && v < self.n);
        self.cells[u * self.n + v]
    }

    /// The outgoing row of `u`, indexed by target.
    #[inline]
    pub fn row(&self, u: usize) -> &[bool] {
        &self.cells[u * self.n..(u + 1) * self.n]
    }

    /// Targets of `u` in ascending id order.
    pub fn out_neighbors(&self, u: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.row(u)
            .iter()
            .enumerate()
            .filter(|(_, edge)| **edge)
            .map(|(v, _)| NodeId(v))
    }

    /// Nodes reachable from `sources` along directed edges, sources included.
    ///
    /// This is the deterministic closure a cascade reaches when every edge
    /// fires.
    pub fn reachable_from(&self, sources: &[NodeId]) -> Vec<bool> {
        let mut reached = vec![false; self.n];
        let mut stack: Vec<usize> = Vec::with_capacity(self.n);
        for source in sources {
            if source.0 < self.n && !reached[source.0] {
                reached[source.0] = true;
                stack.push(source.0);
            }
        }
        while let Some(u) = stack.pop() {
            for v in self.out_neighbors(u) {
                if !reached[v.0] {
                    reached[v.0] = true;
                    stack.push(v.0);
                }
            }
        }
        reached
    }

    fn cell_count(n: usize) -> Result<usize> {
        if n == 0 {
            return Err(CascadeError::invalid("node count must be positive"));
        }
        n.checked_mul(n)
            .ok_or_else(|| CascadeError::invalid(format!("node count {} overflows n*n", n)))
    }

    fn check_len(n: usize, len: usize) -> Result<()> {
        let expected = Self::cell_count(n)?;
        if len != expected {
            return Err(CascadeError::invalid(format!(
                "adjacency buffer has {} cells, expected {} for n={}",
                len, expected, n
            )));
        }
        Ok(())
    }

    fn check_endpoint(n: usize, node: usize) -> Result<()> {
        if node >= n {
            return Err(CascadeError::invalid(format!(
                "edge endpoint {} outside [0, {})",
                node, n
            )));
        }
        Ok(())
    }
}
