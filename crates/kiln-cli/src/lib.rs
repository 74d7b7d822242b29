//! kiln CLI - environment-driven front-end builds.
//!
//! The binary takes one argument, the build environment, and does the rest
//! from `kiln.toml`:
//!
//! - [`cli`] - argument parsing
//! - [`commands`] - configuration resolution and the build itself
//! - [`error`] - CLI errors and exit codes
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - spinner, status messages and the build summary
//! - [`watch`] - file watching and rebuilds for development builds
//!
//! # Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use kiln_cli::{cli::Cli, commands};
//!
//! # #[tokio::main]
//! # async fn main() -> kiln_cli::Result<()> {
//! let args = Cli::parse_from(["kiln", "production"]);
//! commands::execute(&args).await?;
//! # Ok(()) }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;
pub mod watch;

pub use error::{CliError, Result, ResultExt};
