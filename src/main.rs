use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use trimtree::export::{self, ExportFormat, GraphReport, DEFAULT_LIMIT};
use trimtree::graph::{analyze_deletion, GraphBuilder, ImportGraph};
use trimtree::logger::init_logger;
use trimtree::project::{Project, ProjectOptions};

#[derive(Parser)]
#[command(name = "trimtree")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Import graph analyzer that shows what deleting source files takes with it", long_about = None)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and query the import graph of a TypeScript project
    Graph {
        #[command(subcommand)]
        command: GraphCommand,
    },
}

#[derive(Subcommand)]
enum GraphCommand {
    /// Print the import graph reachable from the entrypoints
    Show {
        #[command(flatten)]
        options: GraphOptions,
    },
    /// Report which files must change, and which become unused, if files are deleted
    Remove {
        /// Files to delete
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        options: GraphOptions,
    },
}

#[derive(Args)]
struct GraphOptions {
    /// Path to tsconfig.json
    #[arg(short = 'c', long = "ts-config", default_value = "./tsconfig.json")]
    ts_config: PathBuf,

    /// Glob selecting the entrypoints, relative to the current directory
    #[arg(short, long, default_value = "./**/*.{ts,tsx}")]
    entrypoint: String,

    /// Leave out imports that resolve outside the source directory
    #[arg(long)]
    no_node_modules: bool,

    /// Files whose path starts with this prefix are followed; others are leaf nodes
    #[arg(long, default_value = "src")]
    source_prefix: String,

    /// Output format (log, json)
    #[arg(short = 'f', long = "format-as", default_value = "log")]
    format: ExportFormat,

    /// Number of nodes listed by the log format
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.verbose, cli.quiet, cli.no_color);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Graph { command } => match command {
            GraphCommand::Show { options } => show(&options),
            GraphCommand::Remove { files, options } => remove(&files, &options),
        },
    }
}

fn build_graph(options: &GraphOptions) -> Result<(Project, ImportGraph)> {
    let project_options = ProjectOptions {
        exclude_node_modules: options.no_node_modules,
        source_prefix: options.source_prefix.clone(),
    };
    let project = Project::open(&options.ts_config, project_options)
        .with_context(|| format!("Failed to open project {}", options.ts_config.display()))?;

    let mut builder = GraphBuilder::new(project);
    let graph = builder
        .build(&options.entrypoint)
        .with_context(|| format!("Failed to resolve entrypoints '{}'", options.entrypoint))?;

    if graph.is_empty() {
        warn!(entrypoint = %options.entrypoint, "No imports found from the entrypoints");
    }

    Ok((builder.into_source(), graph))
}

fn show(options: &GraphOptions) -> Result<()> {
    let (_, graph) = build_graph(options)?;

    let report = GraphReport::new(
        options.ts_config.display().to_string(),
        options.entrypoint.clone(),
        options.no_node_modules,
        graph,
    )
    .with_limit(options.limit);

    let mut stdout = io::stdout().lock();
    export::export_graph(options.format, &report, &mut stdout)
        .context("Failed to write graph report")?;
    stdout.flush()?;
    Ok(())
}

fn remove(files: &[PathBuf], options: &GraphOptions) -> Result<()> {
    let (project, graph) = build_graph(options)?;

    let targets: Vec<String> = files.iter().map(|file| project.file_id(file)).collect();
    for target in targets.iter().filter(|target| !graph.contains(target)) {
        warn!(file = %target, "File is not part of the import graph");
    }

    let cycles = graph.cycles();
    if !cycles.is_empty() {
        warn!(
            cycles = cycles.len(),
            "Import cycles found; files only reachable through a cycle are listed for exclusion"
        );
    }

    let info = analyze_deletion(&graph, &targets);
    info!(
        refactor = info.to_refactor.values().map(Vec::len).sum::<usize>(),
        exclude = info.to_exclude.len(),
        "Deletion analyzed"
    );

    let mut stdout = io::stdout().lock();
    export::export_deletion(options.format, &info, &mut stdout)
        .context("Failed to write deletion report")?;
    stdout.flush()?;
    Ok(())
}
