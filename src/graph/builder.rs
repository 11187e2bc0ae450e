//! Graph construction and deletion analysis.
//!
//! [`GraphBuilder`] grows an [`ImportGraph`] breadth first from a set of
//! entrypoints, asking an [`ImportSource`] for each file's direct imports,
//! until a round discovers no new files. [`analyze_deletion`] reports what a
//! built graph loses when files are removed from it.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::import_graph::ImportGraph;

/// Where the builder gets file relationships from.
///
/// Implementations own discovery, parsing and module resolution; the graph
/// code only ever sees file identifiers.
pub trait ImportSource {
    /// Error raised when an entrypoint pattern cannot be expanded.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Expands a pattern into concrete file identifiers.
    fn resolve_entrypoints(&self, pattern: &str) -> Result<Vec<String>, Self::Error>;

    /// Files imported by `file`, in source order.
    ///
    /// Returns `None` when `file` is not a source unit (missing, unreadable or
    /// of an unsupported type). Imports that cannot be resolved are left out.
    fn direct_imports(&mut self, file: &str) -> Option<Vec<String>>;

    /// Whether `file` should be kept out of further expansion.
    fn is_external(&self, file: &str) -> bool;
}

/// Builds import graphs by iterating to a fixed point.
pub struct GraphBuilder<S> {
    source: S,
}

impl<S: ImportSource> GraphBuilder<S> {
    /// Creates a builder reading from `source`.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the underlying import source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consumes the builder, returning the import source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Resolves `pattern` to entrypoints and builds their import graph.
    ///
    /// # Errors
    ///
    /// Fails only when the source cannot expand `pattern`. Files that cannot
    /// be read or parsed are skipped.
    pub fn build(&mut self, pattern: &str) -> Result<ImportGraph, S::Error> {
        let entrypoints = self.source.resolve_entrypoints(pattern)?;
        info!(pattern, count = entrypoints.len(), "Resolved entrypoints");
        Ok(self.build_from(&entrypoints))
    }

    /// Builds the import graph reachable from already-resolved entrypoints.
    ///
    /// Each round processes the files first seen in the previous round. The
    /// node set only grows and is bounded by the files the source can reach,
    /// so the loop ends once a round adds nothing new. Files flagged external
    /// become nodes but are never expanded.
    ///
    /// An entrypoint that imports nothing, and that nothing imports, has no
    /// edge to record and does not appear in the graph.
    pub fn build_from<T: AsRef<str>>(&mut self, entrypoints: &[T]) -> ImportGraph {
        let mut graph = ImportGraph::new();
        let mut processed: HashSet<String> = HashSet::new();
        let mut frontier: Vec<String> = entrypoints
            .iter()
            .map(|entry| entry.as_ref().to_string())
            .collect();
        let mut round = 0;

        while !frontier.is_empty() {
            round += 1;
            let previous = graph.clone();

            for file in &frontier {
                if processed.insert(file.clone()) {
                    graph = self.process_file(graph, file);
                }
            }

            frontier = graph
                .diff_nodes(&previous)
                .into_iter()
                .filter(|node| !processed.contains(*node) && !self.source.is_external(node))
                .map(str::to_string)
                .collect();

            debug!(
                round,
                nodes = graph.node_count(),
                discovered = frontier.len(),
                "Finished graph round"
            );
        }

        info!(
            rounds = round,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Import graph built"
        );

        graph
    }

    /// Records the imports of a single file into `graph`.
    ///
    /// If the source cannot resolve `file`, `graph` is returned unchanged.
    pub fn process_file(&mut self, graph: ImportGraph, file: &str) -> ImportGraph {
        let Some(imports) = self.source.direct_imports(file) else {
            debug!(file, "Not a source unit, skipping");
            return graph;
        };

        imports
            .iter()
            .fold(graph, |acc, target| acc.with_edge(file, target))
    }
}

/// What deleting a set of files does to a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedRefactorInfo {
    /// Each deleted file -> the other files that import it directly.
    pub to_refactor: IndexMap<String, Vec<String>>,
    /// The deleted files plus every file orphaned by the deletion.
    pub to_exclude: Vec<String>,
}

/// Removes `targets` from `graph` one after another, cascading to every
/// node that becomes unreachable.
pub fn prune<T: AsRef<str>>(graph: &ImportGraph, targets: &[T]) -> ImportGraph {
    targets.iter().fold(graph.clone(), |acc, target| {
        acc.delete_node_and_exclusively_reachable_nodes(target.as_ref())
    })
}

/// Reports the blast radius of deleting `targets` from `graph`.
///
/// Dependents are looked up in `graph` as it was before anything was
/// deleted, so the report names every file that needs editing.
///
/// # Example
///
/// ```rust
/// use trimtree::graph::{analyze_deletion, ImportGraph};
///
/// let graph = ImportGraph::new()
///     .add_edge("a.ts", "b.ts")
///     .add_edge("b.ts", "c.ts");
///
/// let info = analyze_deletion(&graph, &["b.ts"]);
/// assert_eq!(info.to_refactor["b.ts"], vec!["a.ts"]);
/// assert_eq!(info.to_exclude, vec!["b.ts", "c.ts"]);
/// ```
pub fn analyze_deletion<T: AsRef<str>>(graph: &ImportGraph, targets: &[T]) -> RemovedRefactorInfo {
    let to_refactor: IndexMap<String, Vec<String>> = targets
        .iter()
        .map(|target| {
            let target = target.as_ref();
            let dependents = graph
                .depends_on(target)
                .into_iter()
                .filter(|dependent| *dependent != target)
                .map(str::to_string)
                .collect();
            (target.to_string(), dependents)
        })
        .collect();

    let remaining = prune(graph, targets);

    let mut to_exclude: IndexSet<String> = targets
        .iter()
        .map(|target| target.as_ref().to_string())
        .collect();
    to_exclude.extend(graph.diff_nodes(&remaining).into_iter().map(str::to_string));

    debug!(
        targets = targets.len(),
        excluded = to_exclude.len(),
        remaining = remaining.node_count(),
        "Analyzed deletion"
    );

    RemovedRefactorInfo {
        to_refactor,
        to_exclude: to_exclude.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::convert::Infallible;

    /// In-memory import source keyed by file name.
    #[derive(Default)]
    struct MapSource {
        files: HashMap<String, Vec<String>>,
        external_prefix: Option<String>,
        calls: Vec<String>,
    }

    impl MapSource {
        fn new(files: &[(&str, &[&str])]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(file, imports)| {
                        (
                            file.to_string(),
                            imports.iter().map(|i| i.to_string()).collect(),
                        )
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn with_external_prefix(mut self, prefix: &str) -> Self {
            self.external_prefix = Some(prefix.to_string());
            self
        }
    }

    impl ImportSource for MapSource {
        type Error = Infallible;

        fn resolve_entrypoints(&self, pattern: &str) -> Result<Vec<String>, Infallible> {
            let prefix = pattern.trim_end_matches('*');
            let mut files: Vec<String> = self
                .files
                .keys()
                .filter(|file| file.starts_with(prefix))
                .cloned()
                .collect();
            files.sort();
            Ok(files)
        }

        fn direct_imports(&mut self, file: &str) -> Option<Vec<String>> {
            self.calls.push(file.to_string());
            self.files.get(file).cloned()
        }

        fn is_external(&self, file: &str) -> bool {
            self.external_prefix
                .as_deref()
                .is_some_and(|prefix| file.starts_with(prefix))
        }
    }

    fn set(nodes: &[&str]) -> HashSet<String> {
        nodes.iter().map(|n| n.to_string()).collect()
    }

    fn node_set(graph: &ImportGraph) -> HashSet<String> {
        graph.list_nodes().into_iter().map(str::to_string).collect()
    }

    fn chain() -> ImportGraph {
        ImportGraph::new().add_edge("A", "B").add_edge("B", "C")
    }

    #[test]
    fn test_build_chain() {
        let source = MapSource::new(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
        let mut builder = GraphBuilder::new(source);

        let graph = builder.build_from(&["A"]);

        assert_eq!(graph, chain());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_build_resolves_pattern() {
        let source = MapSource::new(&[
            ("src/a", &["src/b"]),
            ("src/b", &[]),
            ("lib/x", &["lib/y"]),
            ("lib/y", &[]),
        ]);
        let mut builder = GraphBuilder::new(source);

        let graph = builder.build("src/*").unwrap();

        assert_eq!(node_set(&graph), set(&["src/a", "src/b"]));
    }

    #[test]
    fn test_build_tolerates_cycles() {
        let source = MapSource::new(&[("a", &["b"]), ("b", &["c"]), ("c", &["a", "d"]), ("d", &[])]);
        let mut builder = GraphBuilder::new(source);

        let graph = builder.build_from(&["a"]);

        assert_eq!(node_set(&graph), set(&["a", "b", "c", "d"]));
        assert_eq!(graph.dependencies_of("c").unwrap(), ["a", "d"]);
    }

    #[test]
    fn test_build_matches_transitive_reachability() {
        let files: &[(&str, &[&str])] = &[
            ("main", &["ui", "core"]),
            ("ui", &["core", "widgets"]),
            ("widgets", &["ui"]),
            ("core", &["util"]),
            ("util", &[]),
            ("unused", &["util"]),
        ];
        let mut builder = GraphBuilder::new(MapSource::new(files));

        let graph = builder.build_from(&["main"]);

        assert_eq!(
            node_set(&graph),
            set(&["main", "ui", "core", "widgets", "util"])
        );
        assert!(!graph.contains("unused"));
    }

    #[test]
    fn test_build_is_entry_order_independent() {
        let files: &[(&str, &[&str])] = &[
            ("a", &["shared", "x"]),
            ("b", &["shared", "y"]),
            ("shared", &["z"]),
            ("x", &[]),
            ("y", &["z"]),
            ("z", &[]),
        ];

        let forward = GraphBuilder::new(MapSource::new(files)).build_from(&["a", "b"]);
        let backward = GraphBuilder::new(MapSource::new(files)).build_from(&["b", "a"]);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_build_skips_unresolvable_files() {
        // "missing" is imported but the source knows nothing about it.
        let source = MapSource::new(&[("a", &["missing", "b"]), ("b", &[])]);
        let mut builder = GraphBuilder::new(source);

        let graph = builder.build_from(&["a", "ghost"]);

        assert_eq!(node_set(&graph), set(&["a", "missing", "b"]));
        assert!(graph.dependencies_of("missing").unwrap().is_empty());
        assert!(!graph.contains("ghost"));
    }

    #[test]
    fn test_build_does_not_expand_external_files() {
        let source = MapSource::new(&[
            ("src/a", &["node_modules/lib/index", "src/b"]),
            ("src/b", &[]),
            ("node_modules/lib/index", &["node_modules/lib/deep"]),
        ])
        .with_external_prefix("node_modules/");
        let mut builder = GraphBuilder::new(source);

        let graph = builder.build_from(&["src/a"]);

        assert!(graph.contains("node_modules/lib/index"));
        assert!(!graph.contains("node_modules/lib/deep"));
        assert!(!builder
            .source()
            .calls
            .iter()
            .any(|call| call.starts_with("node_modules/")));
    }

    #[test]
    fn test_build_processes_each_file_once() {
        let source = MapSource::new(&[("a", &["b", "c"]), ("b", &["c"]), ("c", &["a"])]);
        let mut builder = GraphBuilder::new(source);

        builder.build_from(&["a", "a"]);

        let mut calls = builder.into_source().calls;
        calls.sort();
        assert_eq!(calls, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_build_isolated_entrypoint_is_absent() {
        let source = MapSource::new(&[("lonely", &[])]);
        let graph = GraphBuilder::new(source).build_from(&["lonely"]);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_process_file() {
        let source = MapSource::new(&[("a", &["b", "c", "b"])]);
        let mut builder = GraphBuilder::new(source);
        let base = ImportGraph::new();

        let graph = builder.process_file(base.clone(), "a");
        assert_eq!(graph.dependencies_of("a").unwrap(), ["b", "c"]);

        let unchanged = builder.process_file(graph.clone(), "unknown");
        assert_eq!(unchanged, graph);
        assert!(base.is_empty());
    }

    #[test]
    fn test_delete_leaf() {
        let graph = chain();
        let info = analyze_deletion(&graph, &["C"]);

        assert_eq!(info.to_refactor.len(), 1);
        assert_eq!(info.to_refactor["C"], vec!["B"]);
        assert_eq!(info.to_exclude, vec!["C"]);

        let remaining = prune(&graph, &["C"]);
        assert_eq!(node_set(&remaining), set(&["A", "B"]));
        assert_eq!(remaining.dependencies_of("A").unwrap(), ["B"]);
        assert!(remaining.dependencies_of("B").unwrap().is_empty());
    }

    #[test]
    fn test_delete_middle_orphans_leaf() {
        let info = analyze_deletion(&chain(), &["B"]);

        assert_eq!(info.to_refactor["B"], vec!["A"]);
        assert_eq!(
            info.to_exclude.iter().cloned().collect::<HashSet<_>>(),
            set(&["B", "C"])
        );
        assert_eq!(info.to_exclude.len(), 2);
    }

    #[test]
    fn test_delete_reports_pre_deletion_dependents() {
        // B and C are both deleted; C's report still names B.
        let graph = chain().add_edge("D", "C");
        let info = analyze_deletion(&graph, &["B", "C"]);

        assert_eq!(info.to_refactor["B"], vec!["A"]);
        assert_eq!(
            info.to_refactor["C"].iter().cloned().collect::<HashSet<_>>(),
            set(&["B", "D"])
        );
        assert_eq!(
            info.to_exclude.iter().cloned().collect::<HashSet<_>>(),
            set(&["B", "C"])
        );
    }

    #[test]
    fn test_delete_omits_self_import_from_refactor() {
        let graph = chain().add_edge("B", "B");
        let info = analyze_deletion(&graph, &["B"]);
        assert_eq!(info.to_refactor["B"], vec!["A"]);
    }

    #[test]
    fn test_delete_unknown_target_is_still_excluded() {
        let info = analyze_deletion(&chain(), &["Z"]);

        assert!(info.to_refactor["Z"].is_empty());
        assert_eq!(info.to_exclude, vec!["Z"]);
    }

    #[test]
    fn test_delete_order_does_not_change_remaining_nodes() {
        let graph = ImportGraph::new()
            .add_edge("main", "a")
            .add_edge("main", "b")
            .add_edge("a", "shared")
            .add_edge("b", "shared")
            .add_edge("shared", "leaf");

        let forward = prune(&graph, &["a", "b"]);
        let backward = prune(&graph, &["b", "a"]);
        assert_eq!(node_set(&forward), node_set(&backward));
        assert_eq!(node_set(&forward), set(&["main"]));

        let info = analyze_deletion(&graph, &["b", "a"]);
        assert_eq!(
            info.to_exclude.iter().cloned().collect::<HashSet<_>>(),
            set(&["a", "b", "shared", "leaf"])
        );
    }

    #[test]
    fn test_delete_does_not_modify_graph() {
        let graph = chain();
        let _ = analyze_deletion(&graph, &["A", "B"]);
        assert_eq!(graph, chain());
    }

    #[test]
    fn test_removed_refactor_info_json_shape() {
        let info = analyze_deletion(&chain(), &["C"]);
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "toRefactor": { "C": ["B"] }, "toExclude": ["C"] })
        );
    }
}
