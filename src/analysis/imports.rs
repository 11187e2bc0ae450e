//! Import extraction using tree-sitter for JavaScript/TypeScript.
//!
//! This module parses source files and lists the module specifiers they
//! import, in source order. Resolving those specifiers to files is the job
//! of [`super::resolver`].

use std::fs;
use std::path::Path;

use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree, TreeCursor};

/// Errors that can occur during import analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {path}")]
    ParseError { path: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// The syntactic form an import takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import ... from 'module'`, `import 'module'` or `import x = require('module')`
    Static,
    /// `export ... from 'module'`
    ReExport,
    /// `import('module')`
    Dynamic,
    /// `require('module')`
    Require,
}

/// A single module specifier found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The module specifier as written (e.g., "./utils", "@/components/Button", "react")
    pub specifier: String,
    /// How the module is imported
    pub kind: ImportKind,
    /// Line number in the source file (1-indexed)
    pub line: usize,
}

/// Language type for file analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
    Jsx,
}

impl SourceLanguage {
    /// Determine language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            "jsx" => Some(SourceLanguage::Jsx),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    /// Determine language from a file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Get tree-sitter language for this source language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => {
                tree_sitter_javascript::LANGUAGE.into()
            }
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Analyzer for extracting imports from JavaScript/TypeScript source files.
pub struct ImportAnalyzer {
    js_parser: Parser,
    ts_parser: Parser,
    tsx_parser: Parser,
}

impl ImportAnalyzer {
    /// Create a new ImportAnalyzer.
    pub fn new() -> AnalysisResult<Self> {
        Ok(Self {
            js_parser: parser_for(SourceLanguage::JavaScript)?,
            ts_parser: parser_for(SourceLanguage::TypeScript)?,
            tsx_parser: parser_for(SourceLanguage::Tsx)?,
        })
    }

    /// Analyze a single file and extract all imports.
    pub fn analyze_file(&mut self, path: &Path) -> AnalysisResult<Vec<Import>> {
        let language = SourceLanguage::from_path(path).ok_or_else(|| {
            AnalysisError::UnsupportedFileType(path.display().to_string())
        })?;

        let content = fs::read_to_string(path)?;
        self.analyze_source(&content, language, path)
    }

    /// Analyze source code directly.
    pub fn analyze_source(
        &mut self,
        source: &str,
        language: SourceLanguage,
        path: &Path,
    ) -> AnalysisResult<Vec<Import>> {
        let parser = match language {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => &mut self.js_parser,
            SourceLanguage::TypeScript => &mut self.ts_parser,
            SourceLanguage::Tsx => &mut self.tsx_parser,
        };

        let tree = parser.parse(source, None).ok_or_else(|| AnalysisError::ParseError {
            path: path.display().to_string(),
        })?;

        Ok(extract_imports(&tree, source))
    }
}

fn parser_for(language: SourceLanguage) -> AnalysisResult<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|_| AnalysisError::LanguageInit)?;
    Ok(parser)
}

/// Extract imports from a parsed tree.
fn extract_imports(tree: &Tree, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut cursor = tree.root_node().walk();

    visit_node(&mut cursor, source, &mut imports);

    imports
}

/// Recursively visit nodes to find imports.
fn visit_node(cursor: &mut TreeCursor, source: &str, imports: &mut Vec<Import>) {
    let node = cursor.node();

    let found = match node.kind() {
        "import_statement" => parse_import_statement(&node, source),
        "export_statement" => node
            .child_by_field_name("source")
            .and_then(|s| string_value(&s, source))
            .map(|specifier| (specifier, ImportKind::ReExport)),
        "call_expression" => parse_call(&node, source),
        _ => None,
    };

    if let Some((specifier, kind)) = found {
        imports.push(Import {
            specifier,
            kind,
            line: node.start_position().row + 1,
        });
    }

    if cursor.goto_first_child() {
        loop {
            visit_node(cursor, source, imports);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

/// `import ... from 'm'`, `import 'm'` and TypeScript's `import x = require('m')`.
fn parse_import_statement(node: &Node, source: &str) -> Option<(String, ImportKind)> {
    if let Some(module) = node.child_by_field_name("source") {
        return string_value(&module, source).map(|s| (s, ImportKind::Static));
    }

    let mut cursor = node.walk();
    let clause = node
        .children(&mut cursor)
        .find(|child| child.kind() == "import_require_clause")?;

    let module = clause.child_by_field_name("source").or_else(|| {
        let mut clause_cursor = clause.walk();
        let found = clause
            .children(&mut clause_cursor)
            .find(|child| child.kind() == "string");
        found
    })?;

    string_value(&module, source).map(|s| (s, ImportKind::Static))
}

/// `require('m')` or `import('m')` with a plain string argument.
fn parse_call(node: &Node, source: &str) -> Option<(String, ImportKind)> {
    let func = node.child_by_field_name("function")?;
    let kind = match node_text(&func, source)? {
        "require" => ImportKind::Require,
        "import" => ImportKind::Dynamic,
        _ => return None,
    };

    let args = node.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    let first = args.named_children(&mut cursor).next()?;
    if first.kind() != "string" {
        return None;
    }

    string_value(&first, source).map(|s| (s, kind))
}

/// Extract the text content of a node.
fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}

/// Extract string value (removes quotes).
fn string_value(node: &Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let trimmed = node_text(node, source)?
        .trim_start_matches(['"', '\''])
        .trim_end_matches(['"', '\'']);
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str, language: SourceLanguage) -> Vec<Import> {
        let mut analyzer = ImportAnalyzer::new().unwrap();
        analyzer
            .analyze_source(source, language, Path::new("test"))
            .unwrap()
    }

    fn parse_ts(source: &str) -> Vec<Import> {
        parse(source, SourceLanguage::TypeScript)
    }

    fn specifiers(imports: &[Import]) -> Vec<&str> {
        imports.iter().map(|i| i.specifier.as_str()).collect()
    }

    #[test]
    fn test_default_and_named_imports() {
        let imports = parse_ts(
            r#"
import React from 'react';
import { useState, useEffect as effect } from "./hooks";
import * as utils from '../utils';
"#,
        );

        assert_eq!(specifiers(&imports), vec!["react", "./hooks", "../utils"]);
        assert!(imports.iter().all(|i| i.kind == ImportKind::Static));
        assert_eq!(imports[0].line, 2);
        assert_eq!(imports[2].line, 4);
    }

    #[test]
    fn test_side_effect_import() {
        let imports = parse_ts(r#"import './polyfills';"#);

        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].specifier, "./polyfills");
        assert_eq!(imports[0].kind, ImportKind::Static);
    }

    #[test]
    fn test_typescript_type_import() {
        let imports = parse_ts(r#"import type { FC } from './types';"#);

        assert_eq!(specifiers(&imports), vec!["./types"]);
    }

    #[test]
    fn test_import_equals_require() {
        let imports = parse_ts(r#"import fs = require('./fs-shim');"#);

        assert_eq!(specifiers(&imports), vec!["./fs-shim"]);
        assert_eq!(imports[0].kind, ImportKind::Static);
    }

    #[test]
    fn test_re_exports() {
        let imports = parse_ts(
            r#"
export { Button } from './button';
export * from './theme';
export const local = 1;
"#,
        );

        assert_eq!(specifiers(&imports), vec!["./button", "./theme"]);
        assert!(imports.iter().all(|i| i.kind == ImportKind::ReExport));
    }

    #[test]
    fn test_dynamic_import() {
        let imports = parse_ts(r#"const page = await import('./pages/home');"#);

        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].specifier, "./pages/home");
        assert_eq!(imports[0].kind, ImportKind::Dynamic);
    }

    #[test]
    fn test_dynamic_import_with_expression_is_ignored() {
        let imports = parse_ts(r#"const page = await import(`./pages/${name}`);"#);
        assert!(imports.is_empty());
    }

    #[test]
    fn test_require() {
        let imports = parse(
            r#"
const React = require('react');
require('./setup');
"#,
            SourceLanguage::JavaScript,
        );

        assert_eq!(specifiers(&imports), vec!["react", "./setup"]);
        assert!(imports.iter().all(|i| i.kind == ImportKind::Require));
    }

    #[test]
    fn test_source_order_is_preserved() {
        let imports = parse_ts(
            r#"
import { z } from './z';
export * from './a';
import './m';
async function load() {
    return import('./lazy');
}
"#,
        );

        assert_eq!(specifiers(&imports), vec!["./z", "./a", "./m", "./lazy"]);
    }

    #[test]
    fn test_tsx_source() {
        let imports = parse(
            r#"
import { Header } from './Header';
export const App = () => <Header title="hi" />;
"#,
            SourceLanguage::Tsx,
        );

        assert_eq!(specifiers(&imports), vec!["./Header"]);
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            SourceLanguage::from_path(Path::new("src/types.d.ts")),
            Some(SourceLanguage::TypeScript)
        );
        assert_eq!(
            SourceLanguage::from_path(Path::new("App.TSX")),
            Some(SourceLanguage::Tsx)
        );
        assert_eq!(SourceLanguage::from_path(Path::new("styles.css")), None);
        assert_eq!(SourceLanguage::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_analyze_unsupported_file() {
        let mut analyzer = ImportAnalyzer::new().unwrap();
        let result = analyzer.analyze_file(Path::new("data.json"));
        assert!(matches!(result, Err(AnalysisError::UnsupportedFileType(_))));
    }
}
