//! Parser for npm package.json files.
//!
//! Only the entry point fields are read; they let a bare specifier such as
//! `ui-kit` resolve to the file the package actually exposes.

use std::fs;
use std::path::Path;

use super::types::PackageJson;
use super::{ParseError, ParseResult};

/// Parses a package.json file from a file path.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use trimtree::parser::package_json::parse_file;
///
/// let pkg = parse_file(Path::new("node_modules/react/package.json")).unwrap();
/// println!("Entry points: {:?}", pkg.entry_points().collect::<Vec<_>>());
/// ```
pub fn parse_file(path: &Path) -> ParseResult<PackageJson> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a package.json from a string.
///
/// # Example
///
/// ```
/// use trimtree::parser::package_json::parse_str;
///
/// let json = r#"{"name": "my-app", "module": "esm/index.js"}"#;
/// let pkg = parse_str(json).unwrap();
/// assert_eq!(pkg.module, Some("esm/index.js".to_string()));
/// ```
pub fn parse_str(content: &str) -> ParseResult<PackageJson> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if !value.is_object() {
        return Err(ParseError::Invalid(
            "package.json root must be an object".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}
