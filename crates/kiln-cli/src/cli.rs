//! Command-line interface definition for kiln.
//!
//! kiln takes exactly one positional argument, the build environment. Every
//! other knob lives in `kiln.toml` (or `KILN_*` environment variables).

use std::path::PathBuf;

use clap::Parser;

/// kiln - environment-driven front-end build driver
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Environment-driven front-end build driver",
    long_about = "kiln resolves a build configuration from a single environment argument\n\
                  (development or production), assembles the configured plugins and runs\n\
                  the bundler. Development builds keep watching for changes."
)]
pub struct Cli {
    /// Build environment: development (dev) or production (prod)
    #[arg(value_name = "ENVIRONMENT")]
    pub environment: String,

    /// Path to the project file (defaults to kiln.toml in the working directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_environment_and_flags() {
        let cli = Cli::try_parse_from(["kiln", "--cwd", "/srv/app", "-v", "production"]).unwrap();
        assert_eq!(cli.environment, "production");
        assert_eq!(cli.cwd, Some(PathBuf::from("/srv/app")));
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
    }

    #[test]
    fn environment_is_required() {
        assert!(Cli::try_parse_from(["kiln"]).is_err());
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["kiln", "-v", "-q", "dev"]).is_err());
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
