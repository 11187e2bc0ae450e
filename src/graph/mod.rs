//! Graph module for file import relationships.
//!
//! This module provides the immutable [`ImportGraph`] and the
//! [`GraphBuilder`] that grows one from a set of entrypoints.
//!
//! # Example
//!
//! ```rust
//! use trimtree::graph::{analyze_deletion, ImportGraph};
//!
//! let graph = ImportGraph::new()
//!     .add_edge("src/index.ts", "src/app.ts")
//!     .add_edge("src/app.ts", "src/legacy.ts")
//!     .add_edge("src/legacy.ts", "src/legacy-helpers.ts");
//!
//! let info = analyze_deletion(&graph, &["src/legacy.ts"]);
//! assert_eq!(info.to_refactor["src/legacy.ts"], vec!["src/app.ts"]);
//! assert_eq!(info.to_exclude, vec!["src/legacy.ts", "src/legacy-helpers.ts"]);
//! ```

mod builder;
mod import_graph;

pub use builder::{analyze_deletion, prune, GraphBuilder, ImportSource, RemovedRefactorInfo};
pub use import_graph::{Adjacency, CycleInfo, GraphError, GraphResult, ImportGraph};
