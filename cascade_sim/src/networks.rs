//! Test networks for the estimator.
//!
//! A small catalog of hand-built undirected graphs, a seeded Erdős–Rényi
//! generator, and an edge-list loader for real datasets. Node ids are always
//! relabelled to `0..n`.

use crate::error::SimError;
use cascade_core::AdjacencyMatrix;
use cascade_env::CascadeError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Bernoulli, Distribution};
use std::collections::HashMap;
use std::path::Path;

/// Catalog identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkId {
    /// 10-node path
    Chain,

    /// 5-node cycle
    Ring,

    /// Hub with six leaves
    Star,

    /// 7-node tree of depth 3
    Tree,

    /// 3-cycle
    Triangle,

    /// Complete graph on 4 nodes
    Complete4,

    /// Triangle with a pendant node
    Kite,

    /// 5-node clique, each core node with 10 private leaves
    CorePeriphery,

    /// Hub with four strands of two nodes
    Spider,

    /// Largest component of G(200, 0.01), seed 1337
    Random,
}

impl NetworkId {
    /// Returns a list of all networks.
    pub fn all() -> Vec<NetworkId> {
        vec![
            NetworkId::Chain,
            NetworkId::Ring,
            NetworkId::Star,
            NetworkId::Tree,
            NetworkId::Triangle,
            NetworkId::Complete4,
            NetworkId::Kite,
            NetworkId::CorePeriphery,
            NetworkId::Spider,
            NetworkId::Random,
        ]
    }

    /// Returns the network name.
    pub fn name(&self) -> &'static str {
        match self {
            NetworkId::Chain => "chain",
            NetworkId::Ring => "ring",
            NetworkId::Star => "star",
            NetworkId::Tree => "tree",
            NetworkId::Triangle => "triangle",
            NetworkId::Complete4 => "complete4",
            NetworkId::Kite => "kite",
            NetworkId::CorePeriphery => "core_periphery",
            NetworkId::Spider => "spider",
            NetworkId::Random => "random",
        }
    }

    /// Builds the network's adjacency matrix.
    pub fn build(&self) -> Result<AdjacencyMatrix, SimError> {
        let graph = match self {
            NetworkId::Chain => {
                let edges: Vec<_> = (0..9).map(|i| (i, i + 1)).collect();
                AdjacencyMatrix::from_undirected_edges(10, &edges)?
            }
            NetworkId::Ring => AdjacencyMatrix::from_undirected_edges(
                5,
                &[(0, 1), (1, 2), (2, 3), (3, 4), (0, 4)],
            )?,
            NetworkId::Star => {
                let edges: Vec<_> = (1..7).map(|leaf| (0, leaf)).collect();
                AdjacencyMatrix::from_undirected_edges(7, &edges)?
            }
            NetworkId::Tree => AdjacencyMatrix::from_undirected_edges(
                7,
                &[(0, 1), (0, 2), (0, 3), (1, 4), (4, 5), (2, 6)],
            )?,
            NetworkId::Triangle => {
                AdjacencyMatrix::from_undirected_edges(3, &[(0, 1), (1, 2), (2, 0)])?
            }
            NetworkId::Complete4 => AdjacencyMatrix::from_undirected_edges(
                4,
                &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
            )?,
            NetworkId::Kite => {
                AdjacencyMatrix::from_undirected_edges(4, &[(0, 1), (0, 2), (1, 2), (3, 2)])?
            }
            NetworkId::CorePeriphery => {
                let mut edges = Vec::new();
                for a in 0..5 {
                    for b in (a + 1)..5 {
                        edges.push((a, b));
                    }
                }
                for core in 0..5 {
                    for leaf in (core * 10 + 5)..(core * 10 + 15) {
                        edges.push((core, leaf));
                    }
                }
                AdjacencyMatrix::from_undirected_edges(55, &edges)?
            }
            NetworkId::Spider => AdjacencyMatrix::from_undirected_edges(
                9,
                &[(0, 1), (0, 2), (0, 3), (0, 4), (1, 5), (2, 6), (3, 7), (4, 8)],
            )?,
            NetworkId::Random => erdos_renyi(200, 0.01, 1337)?,
        };
        Ok(graph)
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chain" | "path" => Ok(NetworkId::Chain),
            "ring" | "cycle" => Ok(NetworkId::Ring),
            "star" => Ok(NetworkId::Star),
            "tree" => Ok(NetworkId::Tree),
            "triangle" => Ok(NetworkId::Triangle),
            "complete4" | "k4" => Ok(NetworkId::Complete4),
            "kite" => Ok(NetworkId::Kite),
            "core_periphery" | "coreperiphery" => Ok(NetworkId::CorePeriphery),
            "spider" => Ok(NetworkId::Spider),
            "random" | "erdos_renyi" => Ok(NetworkId::Random),
            _ => Err(format!("Unknown network: {}", s)),
        }
    }
}

/// Resolves a catalog name or an edge-list path into `(label, graph)`.
pub fn resolve_network(
    spec: &str,
    mode: EdgeListMode,
) -> Result<(String, AdjacencyMatrix), SimError> {
    if let Ok(id) = spec.parse::<NetworkId>() {
        return Ok((id.name().to_string(), id.build()?));
    }
    let path = Path::new(spec);
    if path.is_file() {
        return Ok((spec.to_string(), load_edge_list(path, mode)?));
    }
    Err(SimError::UnknownNetwork(spec.to_string()))
}

/// Undirected G(n, q) restricted to its largest connected component.
///
/// Pairs `(i, j), i < j` are visited in order and each is kept with
/// probability `q`, drawing from ChaCha8 seeded with `seed`. Component
/// members are relabelled in ascending order of their original id.
pub fn erdos_renyi(n: usize, q: f64, seed: u64) -> Result<AdjacencyMatrix, SimError> {
    if n == 0 {
        return Err(CascadeError::invalid("erdos_renyi needs at least one node").into());
    }
    let coin = Bernoulli::new(q)
        .map_err(|e| CascadeError::invalid(format!("edge probability {}: {}", q, e)))?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if coin.sample(&mut rng) {
                edges.push((i, j));
            }
        }
    }

    let (kept, relabel) = largest_component(n, &edges, true);
    let edges: Vec<(usize, usize)> = edges
        .into_iter()
        .filter_map(|(u, v)| Some((relabel[u]?, relabel[v]?)))
        .collect();
    Ok(AdjacencyMatrix::from_undirected_edges(kept, &edges)?)
}

/// How an edge-list file is turned into a matrix.
///
/// Every mode drops self-loops, keeps only the largest component and
/// relabels its members to `0..n` in ascending order of their file id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeListMode {
    /// Largest strongly connected component, edges kept as written
    Directed,

    /// Largest strongly connected component of the directed reading, then
    /// every edge made bidirectional
    #[default]
    Symmetrized,

    /// Every line is an undirected edge; largest connected component
    Undirected,
}

impl EdgeListMode {
    pub fn name(&self) -> &'static str {
        match self {
            EdgeListMode::Directed => "directed",
            EdgeListMode::Symmetrized => "symmetrized",
            EdgeListMode::Undirected => "undirected",
        }
    }
}

impl std::fmt::Display for EdgeListMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for EdgeListMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "directed" => Ok(EdgeListMode::Directed),
            "symmetrized" | "scc" => Ok(EdgeListMode::Symmetrized),
            "undirected" => Ok(EdgeListMode::Undirected),
            _ => Err(format!("Unknown edge-list mode: {}", s)),
        }
    }
}

/// Returns the size of the largest component and old-id → new-id labels.
///
/// With `symmetric` every edge counts in both directions, so strong
/// components are plain connected components. Ties go to the component
/// holding the smallest id. Kept nodes are relabelled in ascending order.
fn largest_component(
    n: usize,
    edges: &[(usize, usize)],
    symmetric: bool,
) -> (usize, Vec<Option<usize>>) {
    let mut succ = vec![Vec::new(); n];
    let mut pred = vec![Vec::new(); n];
    for &(u, v) in edges {
        succ[u].push(v);
        pred[v].push(u);
        if symmetric {
            succ[v].push(u);
            pred[u].push(v);
        }
    }

    // Kosaraju, pass 1: finishing order on the forward graph
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut stack = vec![(start, 0usize)];
        while let Some(&(u, next)) = stack.last() {
            if let Some(&v) = succ[u].get(next) {
                let top = stack.len() - 1;
                stack[top].1 += 1;
                if !visited[v] {
                    visited[v] = true;
                    stack.push((v, 0));
                }
            } else {
                order.push(u);
                stack.pop();
            }
        }
    }

    // Pass 2: reverse graph in reverse finishing order
    let mut component = vec![usize::MAX; n];
    let mut sizes = Vec::new();
    for &root in order.iter().rev() {
        if component[root] != usize::MAX {
            continue;
        }
        let label = sizes.len();
        let mut size = 0;
        let mut stack = vec![root];
        component[root] = label;
        while let Some(u) = stack.pop() {
            size += 1;
            for &v in &pred[u] {
                if component[v] == usize::MAX {
                    component[v] = label;
                    stack.push(v);
                }
            }
        }
        sizes.push(size);
    }

    let mut best: Option<usize> = None;
    for &label in &component {
        if best.map_or(true, |b| sizes[label] > sizes[b]) {
            best = Some(label);
        }
    }

    let mut relabel = vec![None; n];
    let mut next = 0;
    for node in 0..n {
        if Some(component[node]) == best {
            relabel[node] = Some(next);
            next += 1;
        }
    }
    (next, relabel)
}

/// Loads a whitespace-separated edge list from disk.
pub fn load_edge_list(path: &Path, mode: EdgeListMode) -> Result<AdjacencyMatrix, SimError> {
    let text = std::fs::read_to_string(path)?;
    parse_edge_list(&text, mode)
}

/// Parses `u v [ignored...]` lines into a matrix.
///
/// Blank lines and lines starting with `#` or `%` are skipped. See
/// [`EdgeListMode`] for how the component is chosen and relabelled.
pub fn parse_edge_list(text: &str, mode: EdgeListMode) -> Result<AdjacencyMatrix, SimError> {
    let mut raw_edges: Vec<(u64, u64)> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let mut endpoint = || -> Result<u64, SimError> {
            let raw = fields
                .next()
                .ok_or_else(|| SimError::parse(idx + 1, "expected two node ids"))?;
            raw.parse()
                .map_err(|_| SimError::parse(idx + 1, format!("invalid node id '{}'", raw)))
        };
        let u = endpoint()?;
        let v = endpoint()?;
        raw_edges.push((u, v));
    }

    if raw_edges.is_empty() {
        return Err(SimError::parse(0, "edge list contains no edges"));
    }

    // Dense ids in ascending file-id order
    let mut ids: Vec<u64> = raw_edges.iter().flat_map(|&(u, v)| [u, v]).collect();
    ids.sort_unstable();
    ids.dedup();
    let index: HashMap<u64, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let edges: Vec<(usize, usize)> = raw_edges
        .iter()
        .map(|(u, v)| (index[u], index[v]))
        .filter(|(u, v)| u != v)
        .collect();

    let symmetric = mode == EdgeListMode::Undirected;
    let (kept, relabel) = largest_component(ids.len(), &edges, symmetric);
    let edges: Vec<(usize, usize)> = edges
        .into_iter()
        .filter_map(|(u, v)| Some((relabel[u]?, relabel[v]?)))
        .collect();

    let graph = match mode {
        EdgeListMode::Directed => AdjacencyMatrix::from_edges(kept, &edges)?,
        EdgeListMode::Symmetrized | EdgeListMode::Undirected => {
            AdjacencyMatrix::from_undirected_edges(kept, &edges)?
        }
    };
    Ok(graph)
}
