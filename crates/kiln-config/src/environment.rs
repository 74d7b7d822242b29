//! Build environment and mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment indicator passed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildEnvironment {
    Development,
    Production,
}

impl BuildEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildEnvironment::Development => "development",
            BuildEnvironment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, BuildEnvironment::Production)
    }
}

impl FromStr for BuildEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(BuildEnvironment::Development),
            "production" | "prod" => Ok(BuildEnvironment::Production),
            _ => Err(ConfigError::UnknownEnvironment {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BuildEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optimization mode handed to the bundling engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl From<BuildEnvironment> for Mode {
    fn from(env: BuildEnvironment) -> Self {
        match env {
            BuildEnvironment::Development => Mode::Development,
            BuildEnvironment::Production => Mode::Production,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_short_names() {
        assert_eq!(
            "production".parse::<BuildEnvironment>().unwrap(),
            BuildEnvironment::Production
        );
        assert_eq!(
            "Dev".parse::<BuildEnvironment>().unwrap(),
            BuildEnvironment::Development
        );
        assert_eq!(
            " prod ".parse::<BuildEnvironment>().unwrap(),
            BuildEnvironment::Production
        );
    }

    #[test]
    fn rejects_unknown_environment() {
        let err = "staging".parse::<BuildEnvironment>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEnvironment { value } if value == "staging"));
    }

    #[test]
    fn empty_string_is_not_an_environment() {
        assert!("".parse::<BuildEnvironment>().is_err());
    }
}
