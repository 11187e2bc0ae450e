//! Logging setup for the trimtree CLI.
//!
//! Diagnostics go through `tracing` and are written to stderr, so the
//! graph and deletion reports on stdout stay machine-readable.
//!
//! # Example
//!
//! ```rust,no_run
//! use trimtree::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Building import graph");
//! ```

use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "trimtree=info";

/// Filter forced by the verbosity flags, if any. `verbose` wins over `quiet`.
fn flag_filter(verbose: bool, quiet: bool) -> Option<&'static str> {
    if verbose {
        Some("trimtree=debug")
    } else if quiet {
        Some("trimtree=error")
    } else {
        None
    }
}

/// Install the global subscriber. Call once, before anything logs.
///
/// Without `verbose` or `quiet`, the level comes from `RUST_LOG` and falls
/// back to info for this crate.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = match flag_filter(verbose, quiet) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
