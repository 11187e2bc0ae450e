//! Resolve module specifiers to files on disk.
//!
//! Follows TypeScript's "node" resolution closely enough for dependency
//! graphs: relative paths, tsconfig `paths` and `baseUrl`, then packages in
//! `node_modules` of the importer's ancestors.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::parser::{package_json, TsConfig};

/// Extensions appended to an extensionless candidate, in probing order.
const FILE_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "js", "jsx", "mjs", "cjs", "json"];

/// Index files tried when a candidate is a directory.
const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.d.ts", "index.js", "index.jsx"];

/// Resolves import specifiers for one project.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    config: TsConfig,
}

impl ModuleResolver {
    pub fn new(config: TsConfig) -> Self {
        Self { config }
    }

    /// Resolve `specifier` as imported from the file `importer`.
    ///
    /// Returns a lexically normalized path, or `None` when nothing on disk
    /// matches.
    pub fn resolve(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
        if is_path_like(specifier) {
            let base = importer.parent()?;
            return probe(&normalize(&base.join(specifier)));
        }

        for candidate in self.config.alias_candidates(specifier) {
            if let Some(found) = probe(&normalize(&candidate)) {
                return Some(found);
            }
        }

        if let Some(found) = self
            .config
            .base_url_candidate(specifier)
            .and_then(|candidate| probe(&normalize(&candidate)))
        {
            return Some(found);
        }

        resolve_package(importer, specifier)
    }
}

fn is_path_like(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || specifier.starts_with('/')
}

/// Look for `specifier` in `node_modules` of every ancestor of the importer,
/// falling back to its `@types` package.
fn resolve_package(importer: &Path, specifier: &str) -> Option<PathBuf> {
    let types_name = types_package(specifier);

    for dir in importer.parent()?.ancestors() {
        let modules = dir.join("node_modules");
        if !modules.is_dir() {
            continue;
        }

        if let Some(found) = probe(&normalize(&modules.join(specifier))) {
            return Some(found);
        }

        if let Some(found) = types_name
            .as_deref()
            .and_then(|name| probe(&normalize(&modules.join("@types").join(name))))
        {
            return Some(found);
        }
    }

    debug!(specifier, importer = %importer.display(), "Package not found");
    None
}

/// `lodash/fp` -> `lodash/fp`, `@scope/pkg` -> `scope__pkg`.
fn types_package(specifier: &str) -> Option<String> {
    match specifier.strip_prefix('@') {
        Some(scoped) => {
            let (scope, rest) = scoped.split_once('/')?;
            Some(format!("{scope}__{rest}"))
        }
        None => Some(specifier.to_string()),
    }
}

/// Find the file a candidate path stands for.
fn probe(path: &Path) -> Option<PathBuf> {
    probe_file(path).or_else(|| probe_directory(path))
}

fn probe_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    // `./a.js` written against a TypeScript source
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let siblings: &[&str] = match ext {
            "js" => &["ts", "tsx"],
            "jsx" => &["tsx"],
            "mjs" => &["mts"],
            "cjs" => &["cts"],
            _ => &[],
        };
        if let Some(found) = siblings
            .iter()
            .map(|sibling| path.with_extension(sibling))
            .find(|candidate| candidate.is_file())
        {
            return Some(found);
        }
    }

    FILE_EXTENSIONS
        .iter()
        .map(|ext| with_appended_extension(path, ext))
        .find(|candidate| candidate.is_file())
}

fn probe_directory(path: &Path) -> Option<PathBuf> {
    if !path.is_dir() {
        return None;
    }

    let manifest = path.join("package.json");
    if manifest.is_file() {
        match package_json::parse_file(&manifest) {
            Ok(pkg) => {
                for entry in pkg.entry_points() {
                    let target = normalize(&path.join(entry));
                    if let Some(found) = probe_file(&target).or_else(|| probe_index(&target)) {
                        return Some(found);
                    }
                }
            }
            Err(e) => debug!(path = %manifest.display(), error = %e, "Skipping package.json"),
        }
    }

    probe_index(path)
}

fn probe_index(path: &Path) -> Option<PathBuf> {
    INDEX_FILES
        .iter()
        .map(|index| path.join(index))
        .find(|candidate| candidate.is_file())
}

/// `a.service` + `ts` -> `a.service.ts` (unlike `with_extension`).
fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Collapse `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
