//! TypeScript/JavaScript projects as an import source.
//!
//! [`Project`] ties together entrypoint discovery, tree-sitter import
//! extraction and module resolution, and exposes the result to the graph
//! builder through [`ImportSource`]. File identifiers are paths relative to
//! the directory holding the tsconfig file, always `/`-separated.

mod entrypoints;

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{normalize, AnalysisError, ImportAnalyzer, ModuleResolver, SourceLanguage};
use crate::graph::ImportSource;
use crate::parser::{ParseError, TsConfig};

pub use entrypoints::find_entrypoints;

/// Errors raised while opening or scanning a project.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load tsconfig {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Invalid entrypoint pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to initialize import analyzer: {0}")]
    Analyzer(#[from] AnalysisError),
}

/// Result type for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Knobs controlling what counts as part of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOptions {
    /// Drop resolved imports that fall outside `source_prefix`.
    pub exclude_node_modules: bool,
    /// Identifiers starting with this prefix are expanded; others are
    /// external leaves.
    pub source_prefix: String,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            exclude_node_modules: false,
            source_prefix: "src".to_string(),
        }
    }
}

/// A TypeScript/JavaScript project rooted at its tsconfig directory.
pub struct Project {
    root: PathBuf,
    cwd: PathBuf,
    options: ProjectOptions,
    resolver: ModuleResolver,
    analyzer: ImportAnalyzer,
}

impl Project {
    /// Opens the project described by `tsconfig_path`, relative paths being
    /// taken from the current working directory.
    pub fn open(tsconfig_path: &Path, options: ProjectOptions) -> ProjectResult<Self> {
        let cwd = env::current_dir().map_err(|source| ProjectError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Self::open_in(&cwd, tsconfig_path, options)
    }

    /// Same as [`Project::open`] with an explicit working directory.
    pub fn open_in(cwd: &Path, tsconfig_path: &Path, options: ProjectOptions) -> ProjectResult<Self> {
        let cwd = normalize(cwd);
        let config_path = normalize(&cwd.join(tsconfig_path));
        let config = TsConfig::load(&config_path).map_err(|source| ProjectError::Config {
            path: config_path.clone(),
            source,
        })?;

        info!(
            tsconfig = %config_path.display(),
            aliases = config.paths.len(),
            "Loaded project configuration"
        );

        Ok(Self {
            root: config.root.clone(),
            cwd,
            options,
            resolver: ModuleResolver::new(config),
            analyzer: ImportAnalyzer::new()?,
        })
    }

    /// Identifier of a path given on the command line.
    pub fn file_id(&self, path: &Path) -> String {
        self.id_of(&normalize(&self.cwd.join(path)))
    }

    /// Absolute location of an identifier.
    pub fn path_of(&self, id: &str) -> PathBuf {
        let path = Path::new(id);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn id_of(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }
}

/// Whether `path` names an existing JavaScript/TypeScript file.
fn is_source_unit(path: &Path) -> bool {
    SourceLanguage::from_path(path).is_some() && path.is_file()
}

impl ImportSource for Project {
    type Error = ProjectError;

    fn resolve_entrypoints(&self, pattern: &str) -> ProjectResult<Vec<String>> {
        let paths = find_entrypoints(&self.cwd, pattern).map_err(|source| ProjectError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut ids: Vec<String> = paths.iter().map(|path| self.id_of(path)).collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn direct_imports(&mut self, file: &str) -> Option<Vec<String>> {
        let path = self.path_of(file);
        if !is_source_unit(&path) {
            return None;
        }

        let imports = match self.analyzer.analyze_file(&path) {
            Ok(imports) => imports,
            Err(e) => {
                warn!(file, error = %e, "Skipping file");
                return None;
            }
        };

        let mut targets = Vec::with_capacity(imports.len());
        for import in imports {
            let Some(resolved) = self.resolver.resolve(&path, &import.specifier) else {
                debug!(
                    file,
                    line = import.line,
                    kind = ?import.kind,
                    specifier = %import.specifier,
                    "Unresolved import"
                );
                continue;
            };

            let id = self.id_of(&resolved);
            if self.options.exclude_node_modules && self.is_external(&id) {
                debug!(file, target = %id, "Dropping external import");
                continue;
            }
            targets.push(id);
        }

        Some(targets)
    }

    fn is_external(&self, file: &str) -> bool {
        !file.starts_with(self.options.source_prefix.as_str())
    }
}
