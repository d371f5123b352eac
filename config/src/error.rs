use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors. All of them are fatal before any hand starts.
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Unknown agent: {name}. Available: {available}")]
  UnknownStrategy { name: String, available: String },

  #[error("Invalid override `{0}`: expected KEY=VALUE")]
  InvalidOverride(String),

  #[error("Cannot apply override `{key}`: {reason}")]
  OverrideConflict { key: String, reason: String },

  #[error("Failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("Invalid configuration: {0}")]
  Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
