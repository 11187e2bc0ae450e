//! Export functionality for graph and deletion reports.
//!
//! `graph show` and `graph remove` results can be written as a colored,
//! human-readable log or as JSON for other tools.

pub mod json;
pub mod log;

use std::io::{self, Write};

use crate::graph::{CycleInfo, ImportGraph, RemovedRefactorInfo};

/// Number of nodes the log format lists by default.
pub const DEFAULT_LIMIT: usize = 10;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Human-readable summary
    #[default]
    Log,
    /// JSON format - machine-readable, full data
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" => Ok(ExportFormat::Log),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: log, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Log => write!(f, "log"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// Everything `graph show` reports.
#[derive(Debug, Clone)]
pub struct GraphReport {
    /// tsconfig path as given on the command line
    pub tsconfig_path: String,
    /// Entrypoint pattern as given on the command line
    pub entrypoint: String,
    pub exclude_node_modules: bool,
    pub graph: ImportGraph,
    /// Strongly connected components of `graph`
    pub cycles: Vec<CycleInfo>,
    /// How many nodes the log format lists
    pub limit: usize,
}

impl GraphReport {
    /// Create a report for a built graph, computing its cycles.
    pub fn new(
        tsconfig_path: impl Into<String>,
        entrypoint: impl Into<String>,
        exclude_node_modules: bool,
        graph: ImportGraph,
    ) -> Self {
        Self {
            tsconfig_path: tsconfig_path.into(),
            entrypoint: entrypoint.into(),
            exclude_node_modules,
            cycles: graph.cycles(),
            graph,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Write a built graph.
    fn export_graph<W: Write>(&self, report: &GraphReport, writer: &mut W) -> io::Result<()>;

    /// Write the outcome of a deletion analysis.
    fn export_deletion<W: Write>(
        &self,
        info: &RemovedRefactorInfo,
        writer: &mut W,
    ) -> io::Result<()>;
}

/// Export a graph report in the specified format.
pub fn export_graph<W: Write>(
    format: ExportFormat,
    report: &GraphReport,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Log => log::LogExporter.export_graph(report, writer),
        ExportFormat::Json => json::JsonExporter.export_graph(report, writer),
    }
}

/// Export a deletion analysis in the specified format.
pub fn export_deletion<W: Write>(
    format: ExportFormat,
    info: &RemovedRefactorInfo,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Log => log::LogExporter.export_deletion(info, writer),
        ExportFormat::Json => json::JsonExporter.export_deletion(info, writer),
    }
}
