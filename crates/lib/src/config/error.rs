use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while validating, loading or saving a build configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// No script path was given at all.
  #[error("script path is empty")]
  MissingScript,

  #[error("script file not found: {}", .0.display())]
  ScriptNotFound(PathBuf),

  /// The path exists but is a directory or something else.
  #[error("not a file: {}", .0.display())]
  NotAFile(PathBuf),

  #[error("script must be a .py or .pyw file: {}", .0.display())]
  InvalidScriptExtension(PathBuf),

  #[error("script file is empty: {}", .0.display())]
  EmptyScript(PathBuf),

  #[error("icon file not found: {}", .0.display())]
  IconNotFound(PathBuf),

  #[error("icon must be a {expected} file: {}", .path.display())]
  InvalidIconExtension { path: PathBuf, expected: String },

  /// The config file extension maps to neither JSON nor YAML.
  #[error("config file must be .json, .yaml or .yml: {}", .0.display())]
  UnknownFormat(PathBuf),

  #[error("failed to read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid JSON config: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid YAML config: {0}")]
  Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
  /// Whether this error came from checking the configuration's paths,
  /// as opposed to reading or writing a config file.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::MissingScript
        | Self::ScriptNotFound(_)
        | Self::NotAFile(_)
        | Self::InvalidScriptExtension(_)
        | Self::EmptyScript(_)
        | Self::IconNotFound(_)
        | Self::InvalidIconExtension { .. }
    )
  }
}
