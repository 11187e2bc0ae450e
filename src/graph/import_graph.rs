//! Immutable file import graph.
//!
//! Nodes are file identifiers and edges point from an importing file to the
//! file it imports. Every transforming operation returns a new graph; a value
//! that has been handed out never changes. Adjacency lives behind an [`Arc`]
//! and is copied on write, so cloning a graph to keep a snapshot is cheap.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Node identifier -> direct dependencies, in import declaration order.
pub type Adjacency = IndexMap<String, Vec<String>>;

/// Errors raised by graph queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),
}

/// Result type for graph queries.
pub type GraphResult<T> = Result<T, GraphError>;

/// A directed graph of files and the files they import.
///
/// Node iteration follows insertion order, which keeps output stable, but
/// callers should treat node lists as sets.
///
/// # Example
///
/// ```rust
/// use trimtree::graph::ImportGraph;
///
/// let graph = ImportGraph::new()
///     .add_edge("src/main.ts", "src/app.ts")
///     .add_edge("src/app.ts", "src/util.ts");
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.dependencies_of("src/main.ts").unwrap(), ["src/app.ts"]);
/// assert_eq!(graph.depends_on("src/util.ts"), vec!["src/app.ts"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportGraph {
    adjacency: Arc<Adjacency>,
}

impl From<Adjacency> for ImportGraph {
    fn from(adjacency: Adjacency) -> Self {
        Self::from_adjacency(adjacency)
    }
}

impl ImportGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing adjacency mapping as-is.
    pub fn from_adjacency(adjacency: Adjacency) -> Self {
        Self {
            adjacency: Arc::new(adjacency),
        }
    }

    /// Returns the adjacency mapping, for serialization and inspection.
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Returns a new graph with the edge `from -> to` recorded.
    ///
    /// Both endpoints become nodes if they are not already. An edge that
    /// already exists is not stored twice.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trimtree::graph::ImportGraph;
    ///
    /// let empty = ImportGraph::new();
    /// let once = empty.add_edge("a.ts", "b.ts");
    /// let twice = once.add_edge("a.ts", "b.ts");
    ///
    /// assert!(empty.is_empty());
    /// assert_eq!(once, twice);
    /// assert_eq!(twice.edge_count(), 1);
    /// ```
    pub fn add_edge(&self, from: &str, to: &str) -> Self {
        self.clone().with_edge(from, to)
    }

    /// Consuming form of [`add_edge`](Self::add_edge).
    ///
    /// When no other snapshot shares this graph's storage the edge is written
    /// in place; otherwise the adjacency is copied first.
    pub fn with_edge(mut self, from: &str, to: &str) -> Self {
        let adjacency = Arc::make_mut(&mut self.adjacency);

        if !adjacency.contains_key(from) {
            adjacency.insert(from.to_string(), Vec::new());
        }
        if !adjacency.contains_key(to) {
            adjacency.insert(to.to_string(), Vec::new());
        }

        if let Some(deps) = adjacency.get_mut(from) {
            if !deps.iter().any(|dep| dep == to) {
                deps.push(to.to_string());
            }
        }

        self
    }

    /// Removes `target` and every node that only stayed alive through it.
    ///
    /// `target` is dropped as a node and stripped from every outgoing list.
    /// The source nodes of this graph (in-degree zero, computed before the
    /// removal) are then traversed depth first over the cleaned edges, and
    /// only the nodes they reach are kept.
    ///
    /// A cyclic component that no source node reaches is dropped entirely,
    /// since traversal never starts inside it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trimtree::graph::ImportGraph;
    ///
    /// let graph = ImportGraph::new()
    ///     .add_edge("a.ts", "b.ts")
    ///     .add_edge("b.ts", "c.ts");
    ///
    /// let pruned = graph.delete_node_and_exclusively_reachable_nodes("b.ts");
    /// assert_eq!(pruned.list_nodes(), vec!["a.ts"]);
    /// assert_eq!(graph.node_count(), 3);
    /// ```
    pub fn delete_node_and_exclusively_reachable_nodes(&self, target: &str) -> Self {
        let cleaned: Adjacency = self
            .adjacency
            .iter()
            .filter(|(node, _)| node.as_str() != target)
            .map(|(node, deps)| {
                let deps = deps
                    .iter()
                    .filter(|dep| dep.as_str() != target)
                    .cloned()
                    .collect();
                (node.clone(), deps)
            })
            .collect();

        let visited = reachable(&cleaned, self.sources());

        let pruned: Adjacency = cleaned
            .into_iter()
            .zip(visited)
            .filter_map(|(entry, keep)| keep.then_some(entry))
            .collect();

        Self::from_adjacency(pruned)
    }

    /// Lists every node in the graph.
    pub fn list_nodes(&self) -> Vec<&str> {
        self.adjacency.keys().map(String::as_str).collect()
    }

    /// Nodes present in `self` but absent from `other`.
    pub fn diff_nodes(&self, other: &ImportGraph) -> Vec<&str> {
        self.adjacency
            .keys()
            .filter(|node| !other.contains(node))
            .map(String::as_str)
            .collect()
    }

    /// Direct dependencies of `node`, in import order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `node` is not in the graph.
    pub fn dependencies_of(&self, node: &str) -> GraphResult<&[String]> {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .ok_or_else(|| GraphError::NodeNotFound(node.to_string()))
    }

    /// Nodes with a direct edge to `node`. Empty when nothing imports it or
    /// when `node` is absent.
    pub fn depends_on(&self, node: &str) -> Vec<&str> {
        self.adjacency
            .iter()
            .filter(|(_, deps)| deps.iter().any(|dep| dep == node))
            .map(|(from, _)| from.as_str())
            .collect()
    }

    /// Nodes that nothing in the graph imports.
    pub fn sources(&self) -> Vec<&str> {
        let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(self.adjacency.len());

        for deps in self.adjacency.values() {
            for dep in deps {
                *in_degree.entry(dep.as_str()).or_insert(0) += 1;
            }
        }

        self.adjacency
            .keys()
            .map(String::as_str)
            .filter(|node| !in_degree.contains_key(node))
            .collect()
    }

    /// Returns every import cycle in the graph.
    ///
    /// A cycle is a strongly connected component with more than one node, or
    /// a single node that imports itself. Members are listed in graph order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trimtree::graph::ImportGraph;
    ///
    /// let graph = ImportGraph::new()
    ///     .add_edge("a.ts", "b.ts")
    ///     .add_edge("b.ts", "a.ts")
    ///     .add_edge("b.ts", "c.ts");
    ///
    /// let cycles = graph.cycles();
    /// assert_eq!(cycles.len(), 1);
    /// assert_eq!(cycles[0].cycle_path(), "a.ts -> b.ts -> a.ts");
    /// ```
    pub fn cycles(&self) -> Vec<CycleInfo> {
        let mut graph: DiGraphMap<&str, ()> =
            DiGraphMap::with_capacity(self.node_count(), self.edge_count());

        for (node, deps) in self.adjacency.iter() {
            graph.add_node(node.as_str());
            for dep in deps {
                graph.add_edge(node.as_str(), dep.as_str(), ());
            }
        }

        let position = |node: &str| self.adjacency.get_index_of(node).unwrap_or(usize::MAX);

        let mut cycles: Vec<Vec<&str>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort_by_key(|node| position(*node));
                scc
            })
            .collect();
        cycles.sort_by_key(|scc| position(scc[0]));

        cycles
            .into_iter()
            .map(|scc| CycleInfo {
                nodes: scc.into_iter().map(str::to_string).collect(),
            })
            .collect()
    }

    /// Checks if a node exists in the graph.
    pub fn contains(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Checks if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// Marks every node reachable from `roots`, indexed like `adjacency`.
///
/// Roots that are not keys of `adjacency` are ignored. A node is marked
/// before its neighbours are pushed, so cycles terminate.
fn reachable<'a>(adjacency: &Adjacency, roots: impl IntoIterator<Item = &'a str>) -> Vec<bool> {
    let mut visited = vec![false; adjacency.len()];
    let mut stack = Vec::new();

    for root in roots {
        let Some(start) = adjacency.get_index_of(root) else {
            continue;
        };
        stack.push(start);

        while let Some(idx) = stack.pop() {
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            let Some((_, deps)) = adjacency.get_index(idx) else {
                continue;
            };
            for dep in deps.iter().rev() {
                if let Some(next) = adjacency.get_index_of(dep.as_str()) {
                    if !visited[next] {
                        stack.push(next);
                    }
                }
            }
        }
    }

    visited
}

/// Information about a detected import cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// The files in the cycle (the last connects back to the first)
    pub nodes: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.nodes.first() else {
            return String::new();
        };
        format!("{} -> {}", self.nodes.join(" -> "), first)
    }

    /// Returns the number of files in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
