//! Entrypoint discovery from shell-style glob patterns.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::analysis::{normalize, SourceLanguage};

/// Files matching `pattern`, which is taken relative to `base` unless absolute.
///
/// The pattern supports `*`, `**`, `?`, `[...]` and `{a,b}` alternation.
/// Only JavaScript/TypeScript files are returned, and `node_modules` is never
/// entered. Paths are normalized and sorted.
pub fn find_entrypoints(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, globset::Error> {
    let (root, rest) = walk_root(base, pattern);
    let matcher = if rest.is_empty() {
        None
    } else {
        Some(compile(&rest)?)
    };

    let mut found = BTreeSet::new();
    for entry in WalkDir::new(&root)
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || SourceLanguage::from_path(path).is_none() {
            continue;
        }

        let matched = match &matcher {
            Some(set) => path
                .strip_prefix(&root)
                .map(|relative| set.is_match(relative))
                .unwrap_or(false),
            None => path == root,
        };
        if matched {
            found.insert(path.to_path_buf());
        }
    }

    Ok(found.into_iter().collect())
}

fn compile(pattern: &str) -> Result<GlobSet, globset::Error> {
    let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
    let mut builder = GlobSetBuilder::new();
    builder.add(glob);
    builder.build()
}

/// Directory to walk, and the part of the pattern matched below it.
///
/// Leading components without glob syntax (including `.` and `..`) are
/// folded into the walk root.
fn walk_root(base: &Path, pattern: &str) -> (PathBuf, String) {
    let mut root = if Path::new(pattern).is_absolute() {
        PathBuf::from("/")
    } else {
        base.to_path_buf()
    };
    let mut parts = pattern.split('/').filter(|p| !p.is_empty()).peekable();

    while let Some(part) = parts.next_if(|part| !has_glob_meta(part)) {
        root.push(part);
    }

    (normalize(&root), parts.collect::<Vec<_>>().join("/"))
}

fn has_glob_meta(part: &str) -> bool {
    part.contains(['*', '?', '[', '{'])
}

fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    matches!(entry.file_name().to_string_lossy().as_ref(), "node_modules" | ".git")
}
