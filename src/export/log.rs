//! Human-readable export implementation.
//!
//! Lists the first few nodes of a graph with their imports, and flags
//! import cycles: a file that only a cycle reaches counts as unused when
//! its last outside importer is deleted.

use super::{Exporter, GraphReport};
use crate::graph::RemovedRefactorInfo;
use colored::Colorize;
use std::io::{self, Write};

/// Log exporter implementation.
pub struct LogExporter;

impl Exporter for LogExporter {
    fn export_graph<W: Write>(&self, report: &GraphReport, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{} {}", "tsconfig:".bold(), report.tsconfig_path)?;
        writeln!(writer, "{} {}", "entrypoint:".bold(), report.entrypoint)?;
        writeln!(
            writer,
            "{} {}",
            "excludeNodeModules:".bold(),
            report.exclude_node_modules
        )?;
        writeln!(writer)?;

        let graph = &report.graph;
        writeln!(
            writer,
            "{} {} files, {} imports",
            "Import graph:".cyan().bold(),
            graph.node_count(),
            graph.edge_count()
        )?;

        for (node, deps) in graph.adjacency().iter().take(report.limit) {
            writeln!(writer, "- {}", node.cyan())?;
            for dep in deps {
                writeln!(writer, "|-- {}", dep)?;
            }
        }

        let hidden = graph.node_count().saturating_sub(report.limit);
        if hidden > 0 {
            writeln!(
                writer,
                "{}",
                format!("... {} more files (raise --limit to list them)", hidden).dimmed()
            )?;
        }

        if !report.cycles.is_empty() {
            writeln!(writer)?;
            writeln!(
                writer,
                "{} {} import cycle(s); files reachable only through a cycle are dropped on deletion",
                "Warning:".yellow().bold(),
                report.cycles.len()
            )?;
            for cycle in &report.cycles {
                writeln!(writer, "  {}", cycle.cycle_path().yellow())?;
            }
        }

        Ok(())
    }

    fn export_deletion<W: Write>(
        &self,
        info: &RemovedRefactorInfo,
        writer: &mut W,
    ) -> io::Result<()> {
        writeln!(writer, "{}", "Files to refactor".cyan().bold())?;
        for (target, dependents) in &info.to_refactor {
            if dependents.is_empty() {
                writeln!(writer, "- {} {}", target, "(no importers)".dimmed())?;
                continue;
            }
            writeln!(writer, "- {}", target)?;
            for dependent in dependents {
                writeln!(writer, "|-- {}", dependent)?;
            }
        }
        writeln!(writer)?;

        writeln!(
            writer,
            "{} ({})",
            "Files to exclude".red().bold(),
            info.to_exclude.len()
        )?;
        for file in &info.to_exclude {
            writeln!(writer, "- {}", file)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{analyze_deletion, ImportGraph};

    fn render_graph(report: &GraphReport) -> String {
        colored::control::set_override(false);
        let mut output = Vec::new();
        LogExporter.export_graph(report, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_log_export_graph() {
        let graph = ImportGraph::new()
            .with_edge("src/main.ts", "src/app.ts")
            .with_edge("src/app.ts", "src/util.ts");
        let text = render_graph(&GraphReport::new("./tsconfig.json", "src/main.ts", false, graph));

        assert!(text.contains("tsconfig: ./tsconfig.json"));
        assert!(text.contains("excludeNodeModules: false"));
        assert!(text.contains("3 files, 2 imports"));
        assert!(text.contains("- src/main.ts\n|-- src/app.ts\n"));
        assert!(!text.contains("more files"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_log_export_respects_limit() {
        let graph = (0..15).fold(ImportGraph::new(), |acc, i| {
            acc.with_edge(&format!("src/{i}.ts"), &format!("src/{}.ts", i + 1))
        });
        let text = render_graph(&GraphReport::new("t", "e", false, graph));

        assert!(text.contains("\n- src/9.ts\n"));
        assert!(text.contains("|-- src/10.ts\n"));
        assert!(!text.contains("\n- src/10.ts\n"));
        assert!(text.contains("... 6 more files"));
    }

    #[test]
    fn test_log_export_warns_about_cycles() {
        let graph = ImportGraph::new()
            .with_edge("src/a.ts", "src/b.ts")
            .with_edge("src/b.ts", "src/a.ts");
        let text = render_graph(&GraphReport::new("t", "e", false, graph));

        assert!(text.contains("1 import cycle(s)"));
        assert!(text.contains("src/a.ts -> src/b.ts -> src/a.ts"));
    }

    #[test]
    fn test_log_export_deletion() {
        colored::control::set_override(false);
        let graph = ImportGraph::new()
            .with_edge("src/main.ts", "src/app.ts")
            .with_edge("src/app.ts", "src/util.ts");
        let info = analyze_deletion(&graph, &["src/app.ts", "src/main.ts"]);

        let mut output = Vec::new();
        LogExporter.export_deletion(&info, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("- src/app.ts\n|-- src/main.ts\n"));
        assert!(text.contains("- src/main.ts (no importers)"));
        assert!(text.contains("Files to exclude (3)"));
        assert!(text.contains("- src/util.ts"));
    }
}
