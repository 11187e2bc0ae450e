//! Parser for tsconfig.json / jsconfig.json module resolution settings.
//!
//! TypeScript accepts comments and trailing commas in its config files, so
//! both are stripped before the content reaches `serde_json`. Base configs
//! named by `extends` are loaded first and overridden field by field.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::RawTsConfig;
use super::{ParseError, ParseResult};

/// Module resolution settings of a TypeScript project.
#[derive(Debug, Clone, Default)]
pub struct TsConfig {
    /// Directory containing the config file.
    pub root: PathBuf,
    /// Absolute `compilerOptions.baseUrl`, if set.
    pub base_url: Option<PathBuf>,
    /// `compilerOptions.paths`, most specific pattern first.
    pub paths: Vec<PathAlias>,
}

/// One entry of `compilerOptions.paths`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAlias {
    /// Pattern with at most one `*`, e.g. `@/*`.
    pub pattern: String,
    /// Substitutions, already joined onto `baseUrl` (or the config directory).
    pub targets: Vec<PathBuf>,
}

impl PathAlias {
    /// Exact patterns win over wildcards; longer prefixes win over shorter.
    fn specificity(&self) -> (bool, usize) {
        match self.pattern.split_once('*') {
            Some((prefix, _)) => (false, prefix.len()),
            None => (true, self.pattern.len()),
        }
    }
}

/// Settings accumulated along an `extends` chain, last writer wins.
#[derive(Debug, Default)]
struct Inherited {
    base_url: Option<PathBuf>,
    /// Directory of the config that declared `paths`, and the raw mapping.
    paths: Option<(PathBuf, HashMap<String, Vec<String>>)>,
}

impl Inherited {
    fn finish(self, root: &Path) -> TsConfig {
        let mut paths: Vec<PathAlias> = match self.paths {
            Some((declared_in, raw)) => {
                let base = self.base_url.clone().unwrap_or(declared_in);
                raw.into_iter()
                    .map(|(pattern, targets)| PathAlias {
                        pattern,
                        targets: targets.iter().map(|t| base.join(t)).collect(),
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        paths.sort_by(|a, b| {
            b.specificity()
                .cmp(&a.specificity())
                .then_with(|| a.pattern.cmp(&b.pattern))
        });

        TsConfig {
            root: root.to_path_buf(),
            base_url: self.base_url,
            paths,
        }
    }
}

impl TsConfig {
    /// Reads and parses a config file, following `extends`.
    pub fn load(path: &Path) -> ParseResult<Self> {
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut inherited = Inherited::default();
        collect_file(path, &mut Vec::new(), &mut inherited)?;
        Ok(inherited.finish(&root))
    }

    /// Parses config content whose relative paths are anchored at `root`.
    ///
    /// Relative `extends` entries are looked up from `root` as well.
    pub fn parse_str(content: &str, root: &Path) -> ParseResult<Self> {
        let mut inherited = Inherited::default();
        collect_content(content, root, &mut Vec::new(), &mut inherited)?;
        Ok(inherited.finish(root))
    }

    /// Candidate paths for `specifier` from the best matching `paths` entry.
    ///
    /// Empty when no pattern matches. The candidates still need probing for
    /// extensions and index files.
    pub fn alias_candidates(&self, specifier: &str) -> Vec<PathBuf> {
        self.paths
            .iter()
            .find_map(|alias| {
                let matched = match_pattern(&alias.pattern, specifier)?;
                Some(
                    alias
                        .targets
                        .iter()
                        .map(|target| substitute(target, matched))
                        .collect(),
                )
            })
            .unwrap_or_default()
    }

    /// `specifier` joined onto `baseUrl`, when one is configured.
    pub fn base_url_candidate(&self, specifier: &str) -> Option<PathBuf> {
        self.base_url.as_ref().map(|base| base.join(specifier))
    }
}

/// Apply the config at `path` (and its bases) onto `inherited`.
///
/// `chain` holds the configs currently being loaded, so a config that
/// extends itself, directly or not, is reported instead of recursing.
fn collect_file(path: &Path, chain: &mut Vec<PathBuf>, inherited: &mut Inherited) -> ParseResult<()> {
    let key = fs::canonicalize(path)?;
    if chain.contains(&key) {
        return Err(ParseError::Invalid(format!(
            "tsconfig extends cycle through {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let root = path.parent().map(Path::to_path_buf).unwrap_or_default();

    chain.push(key);
    collect_content(&content, &root, chain, inherited)?;
    chain.pop();
    Ok(())
}

fn collect_content(
    content: &str,
    root: &Path,
    chain: &mut Vec<PathBuf>,
    inherited: &mut Inherited,
) -> ParseResult<()> {
    let clean = strip_trailing_commas(&strip_json_comments(content));
    let raw: RawTsConfig = serde_json::from_str(&clean)?;

    for base in raw.extends.map(|e| e.into_vec()).unwrap_or_default() {
        let base_path = resolve_extends(root, &base).ok_or_else(|| {
            ParseError::Invalid(format!(
                "cannot find base config '{}' from {}",
                base,
                root.display()
            ))
        })?;
        collect_file(&base_path, chain, inherited)?;
    }

    if let Some(options) = raw.compiler_options {
        if let Some(base_url) = options.base_url {
            inherited.base_url = Some(root.join(base_url));
        }
        if let Some(paths) = options.paths {
            inherited.paths = Some((root.to_path_buf(), paths));
        }
    }

    Ok(())
}

/// Locate an `extends` target: a path relative to the extending config, or
/// a config shipped in a package under `node_modules`.
fn resolve_extends(dir: &Path, spec: &str) -> Option<PathBuf> {
    let with_json = |path: PathBuf| -> Option<PathBuf> {
        if path.is_file() {
            return Some(path);
        }
        let mut name = path.into_os_string();
        name.push(".json");
        let path = PathBuf::from(name);
        path.is_file().then_some(path)
    };

    if spec.starts_with('.') || Path::new(spec).is_absolute() {
        return with_json(dir.join(spec));
    }

    dir.ancestors().find_map(|ancestor| {
        let package = ancestor.join("node_modules").join(spec);
        with_json(package.clone()).or_else(|| {
            let nested = package.join("tsconfig.json");
            nested.is_file().then_some(nested)
        })
    })
}

/// Returns the part of `import` matched by the `*` in `pattern`.
fn match_pattern<'a>(pattern: &str, import: &'a str) -> Option<&'a str> {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            if import.len() < prefix.len() + suffix.len() {
                return None;
            }
            import.strip_prefix(prefix)?.strip_suffix(suffix)
        }
        None if pattern == import => Some(""),
        None => None,
    }
}

fn substitute(target: &Path, matched: &str) -> PathBuf {
    let target_str = target.to_string_lossy();
    if target_str.contains('*') {
        PathBuf::from(target_str.replacen('*', matched, 1))
    } else {
        target.to_path_buf()
    }
}

/// Strip single-line (//) and multi-line (/* */) comments from JSON.
fn strip_json_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                result.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for ch in chars.by_ref() {
                    if ch == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                while let Some(ch) = chars.next() {
                    if ch == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => result.push(c),
        }
    }

    result
}

/// Drop commas that directly precede a closing `}` or `]`.
fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            result.push(c);
            if c == '\\' {
                if let Some(&next) = chars.get(i + 1) {
                    result.push(next);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            result.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if !matches!(next, Some('}') | Some(']')) {
                result.push(c);
            }
        } else {
            result.push(c);
        }
        i += 1;
    }

    result
}
