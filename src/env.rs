//! Startup environment validation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Name of the variable holding the deployment environment.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Error returned when the process environment is invalid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("missing {0} environment variable")]
    Missing(&'static str),
    #[error("invalid {var} value '{value}': expected one of development, staging, production")]
    Invalid { var: &'static str, value: String },
}

/// Deployment environment the process runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Reads and validates `ENVIRONMENT` from the process environment.
    pub fn from_env() -> Result<Self, EnvError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Environment::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EnvError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = lookup(ENVIRONMENT_VAR).ok_or(EnvError::Missing(ENVIRONMENT_VAR))?;
        value.parse()
    }

    /// Value as written in `ENVIRONMENT`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Logging threshold used in this environment.
    pub fn log_level(self) -> LogLevel {
        log_level_for(Some(self.as_str()))
    }
}

impl FromStr for Environment {
    type Err = EnvError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(EnvError::Invalid {
                var: ENVIRONMENT_VAR,
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging threshold for a raw environment name.
///
/// `testing` silences logs; unknown or missing names fall back to `Debug`.
pub fn log_level_for(environment: Option<&str>) -> LogLevel {
    match environment {
        Some("production") => LogLevel::Info,
        Some("staging") => LogLevel::Verbose,
        Some("testing") => LogLevel::Silent,
        _ => LogLevel::Debug,
    }
}
