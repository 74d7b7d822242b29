//! Command implementations for the kiln CLI.
//!
//! kiln has a single command: resolve the configuration for the requested
//! environment, then build once (production) or keep rebuilding (development).

mod build;

pub use build::{build_once, execute, prepare, resolve_path, Prepared};
