//! kiln - environment-driven front-end build driver.
//!
//! Parses arguments, sets up logging and colors, runs the build and maps
//! failures to an exit code.

use std::process::ExitCode;

use clap::Parser;
use kiln_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    match commands::execute(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", error::cli_error_to_miette(err));
            ExitCode::from(code)
        }
    }
}
