//! JSON export implementation.
//!
//! Keys are camelCase so the output can be consumed directly by JavaScript
//! tooling.

use super::{Exporter, GraphReport};
use crate::graph::{ImportGraph, RemovedRefactorInfo};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Root structure of `graph show` output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonGraph<'a> {
    tsconfig_path: &'a str,
    entrypoint: &'a str,
    exclude_node_modules: bool,
    graph: &'a ImportGraph,
}

fn write_pretty<W: Write, T: Serialize>(value: &T, writer: &mut W) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    writeln!(writer, "{}", json)
}

impl Exporter for JsonExporter {
    fn export_graph<W: Write>(&self, report: &GraphReport, writer: &mut W) -> io::Result<()> {
        let export = JsonGraph {
            tsconfig_path: &report.tsconfig_path,
            entrypoint: &report.entrypoint,
            exclude_node_modules: report.exclude_node_modules,
            graph: &report.graph,
        };

        write_pretty(&export, writer)
    }

    fn export_deletion<W: Write>(
        &self,
        info: &RemovedRefactorInfo,
        writer: &mut W,
    ) -> io::Result<()> {
        write_pretty(info, writer)
    }
}
