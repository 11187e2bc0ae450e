//! Parser module for project manifests.
//!
//! This module reads the JSON manifests that steer module resolution.
//!
//! # Supported Formats
//!
//! - **tsconfig.json / jsconfig.json** - `baseUrl` and `paths`, comments allowed
//! - **package.json** - entry point fields of installed packages
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use trimtree::parser::TsConfig;
//!
//! let config = TsConfig::load(Path::new("tsconfig.json")).unwrap();
//! for candidate in config.alias_candidates("@/components/Button") {
//!     println!("{}", candidate.display());
//! }
//! ```

pub mod package_json;
pub mod tsconfig;
pub mod types;

/// Errors that can occur while reading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest parsed but has the wrong shape.
    #[error("Invalid manifest: {0}")]
    Invalid(String),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

// Re-export commonly used types for convenience
pub use tsconfig::TsConfig;
pub use types::PackageJson;
