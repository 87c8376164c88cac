//! Common types shared by the estimator crates.

use crate::error::{CascadeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Index of a node in a graph of `n` nodes, valid range `[0, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Creates a NodeId from a raw index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Converts a signed id coming from a flat boundary.
    ///
    /// Negative ids and ids `>= n` are rejected.
    pub fn from_signed(raw: i64, n: usize) -> Result<Self> {
        if raw < 0 || raw as u64 >= n as u64 {
            return Err(CascadeError::invalid(format!(
                "node id {} outside [0, {})",
                raw, n
            )));
        }
        Ok(Self(raw as usize))
    }

    /// Returns the raw index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered set of initially active nodes.
///
/// Order matters: seeds are pushed onto the frontier in this order, which
/// fixes the sequence of random draws a cascade consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSet {
    nodes: Vec<NodeId>,
}

impl SeedSet {
    /// Creates an empty seed set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a seed set without validation.
    ///
    /// Call [`SeedSet::validate`] against the graph size before simulating.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    /// Builds a seed set from raw indices.
    pub fn from_indices(indices: &[usize]) -> Self {
        Self {
            nodes: indices.iter().copied().map(NodeId).collect(),
        }
    }

    /// Checks every id is in `[0, n)` and no id repeats.
    pub fn validate(&self, n: usize) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.0 >= n {
                return Err(CascadeError::invalid(format!(
                    "seed {} outside [0, {})",
                    node.0, n
                )));
            }
            if !seen.insert(node.0) {
                return Err(CascadeError::invalid(format!("duplicate seed {}", node.0)));
            }
        }
        Ok(())
    }

    /// Returns the first `len` seeds as a new set.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            nodes: self.nodes[..len.min(self.nodes.len())].to_vec(),
        }
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<NodeId> for SeedSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
