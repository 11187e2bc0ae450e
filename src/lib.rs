//! trimtree - import graph analyzer for TypeScript/JavaScript projects
//!
//! This crate builds the graph of files reachable from a project's
//! entrypoints and reports the blast radius of deleting files from it:
//! which importers need refactoring, and which files become unused.

pub mod analysis;
pub mod export;
pub mod graph;
pub mod logger;
pub mod parser;
pub mod project;
