//! Shared types for manifest parsing.
//!
//! These structs capture only the fields module resolution needs; anything
//! else in the manifests is ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The parts of a package.json file that decide which file a package
/// specifier resolves to.
///
/// # Example
///
/// ```
/// use trimtree::parser::types::PackageJson;
///
/// let json = r#"{"name": "ui-kit", "main": "dist/index.js", "types": "dist/index.d.ts"}"#;
/// let pkg: PackageJson = serde_json::from_str(json).unwrap();
/// assert_eq!(pkg.entry_points().collect::<Vec<_>>(), vec!["dist/index.d.ts", "dist/index.js"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageJson {
    /// Bundled type declarations.
    pub types: Option<String>,

    /// Older spelling of `types`.
    pub typings: Option<String>,

    /// ES module entry point used by bundlers.
    pub module: Option<String>,

    /// CommonJS entry point.
    pub main: Option<String>,
}

impl PackageJson {
    /// Entry files in resolution order: `types`, `typings`, `module`, `main`.
    pub fn entry_points(&self) -> impl Iterator<Item = &str> {
        [&self.types, &self.typings, &self.module, &self.main]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .filter(|entry| !entry.trim().is_empty())
    }
}

/// The raw shape of a tsconfig.json / jsconfig.json file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTsConfig {
    /// Base config(s) this one inherits from.
    #[serde(default)]
    pub extends: Option<Extends>,

    #[serde(rename = "compilerOptions", default)]
    pub compiler_options: Option<CompilerOptions>,
}

/// `extends` is a single path, or a list since TypeScript 5.0.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    /// Base configs in application order; later entries override earlier.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Extends::One(path) => vec![path],
            Extends::Many(paths) => paths,
        }
    }
}

/// Module resolution settings from `compilerOptions`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompilerOptions {
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,

    /// Alias pattern -> substitution targets, e.g. `"@/*": ["src/*"]`.
    pub paths: Option<HashMap<String, Vec<String>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_json_default() {
        let pkg = PackageJson::default();
        assert!(pkg.main.is_none());
        assert_eq!(pkg.entry_points().count(), 0);
    }

    #[test]
    fn test_entry_points_order() {
        let pkg = PackageJson {
            main: Some("index.js".to_string()),
            module: Some("esm/index.js".to_string()),
            typings: Some("index.d.ts".to_string()),
            ..PackageJson::default()
        };

        let entries: Vec<_> = pkg.entry_points().collect();
        assert_eq!(entries, vec!["index.d.ts", "esm/index.js", "index.js"]);
    }

    #[test]
    fn test_extends_single_or_list() {
        let one: RawTsConfig = serde_json::from_str(r#"{ "extends": "./base.json" }"#).unwrap();
        assert_eq!(one.extends.unwrap().into_vec(), vec!["./base.json"]);

        let many: RawTsConfig =
            serde_json::from_str(r#"{ "extends": ["./a.json", "./b.json"] }"#).unwrap();
        assert_eq!(many.extends.unwrap().into_vec(), vec!["./a.json", "./b.json"]);

        let none: RawTsConfig = serde_json::from_str("{}").unwrap();
        assert!(none.extends.is_none());
    }

    #[test]
    fn test_entry_points_skip_blank() {
        let pkg = PackageJson {
            types: Some("  ".to_string()),
            main: Some("lib.js".to_string()),
            ..PackageJson::default()
        };

        assert_eq!(pkg.entry_points().collect::<Vec<_>>(), vec!["lib.js"]);
    }
}
