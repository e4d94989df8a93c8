//! Balancer configuration
//!
//! Configuration loaded from environment variables and command line.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing topology snapshot: pass --snapshot or set QUERYCOORD_SNAPSHOT")]
    MissingSnapshot,

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// How plans are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON array
    #[default]
    Json,
    /// Indented JSON array
    Pretty,
    /// One line per plan
    Text,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "text" => Ok(Self::Text),
            other => Err(ConfigError::InvalidValue(
                "QUERYCOORD_OUTPUT".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// Balancer tool configuration
#[derive(Debug, Clone, Default)]
pub struct BalancerConfig {
    /// Topology snapshot to plan against
    pub snapshot_path: Option<PathBuf>,

    /// Plan output format
    pub output: OutputFormat,

    /// Emit logs as JSON
    pub log_json: bool,
}

impl BalancerConfig {
    /// Create configuration from environment variables
    ///
    /// An output format given on the command line takes the place of
    /// QUERYCOORD_OUTPUT, which is then left unparsed.
    pub fn from_env(output: Option<OutputFormat>) -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok(), output)
    }

    fn from_vars(
        var: impl Fn(&str) -> Option<String>,
        output: Option<OutputFormat>,
    ) -> Result<Self, ConfigError> {
        let snapshot_path = var("QUERYCOORD_SNAPSHOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let output = match output {
            Some(format) => format,
            None => match var("QUERYCOORD_OUTPUT") {
                Some(v) => v.parse()?,
                None => OutputFormat::default(),
            },
        };

        let log_json = var("QUERYCOORD_LOG_JSON")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            snapshot_path,
            output,
            log_json,
        })
    }

    /// Get the snapshot path, failing if none was configured
    pub fn snapshot_path(&self) -> Result<&Path, ConfigError> {
        self.snapshot_path
            .as_deref()
            .ok_or(ConfigError::MissingSnapshot)
    }
}
