//! Source code analysis for trimtree.
//!
//! Two steps turn a file into graph edges:
//!
//! - [`ImportAnalyzer`] parses JavaScript/TypeScript with tree-sitter and
//!   lists the module specifiers a file imports (ES imports, re-exports,
//!   `require()` and dynamic `import()`).
//! - [`ModuleResolver`] maps each specifier to a file, honoring tsconfig
//!   `paths`/`baseUrl` and `node_modules` packages.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use trimtree::analysis::{ImportAnalyzer, ModuleResolver};
//! use trimtree::parser::TsConfig;
//!
//! let resolver = ModuleResolver::new(TsConfig::load(Path::new("tsconfig.json"))?);
//! let mut analyzer = ImportAnalyzer::new()?;
//!
//! let file = Path::new("src/index.ts");
//! for import in analyzer.analyze_file(file)? {
//!     println!("{} -> {:?}", import.specifier, resolver.resolve(file, &import.specifier));
//! }
//! ```

pub mod imports;
pub mod resolver;

pub use imports::{AnalysisError, AnalysisResult, Import, ImportAnalyzer, ImportKind, SourceLanguage};
pub use resolver::{normalize, ModuleResolver};
