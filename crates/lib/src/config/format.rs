//! JSON and YAML encodings of a build configuration.
//!
//! Both encodings carry the same flat mapping of fields; path fields are plain
//! strings. Files are told apart by extension.

use std::fmt;
use std::path::Path;

use tracing::debug;

use super::{BuildConfig, BuildConfigFields, ConfigError};

/// Supported config file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
  Json,
  Yaml,
}

impl ConfigFormat {
  /// Pick the format from a file extension (`.json`, `.yaml`, `.yml`).
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let ext = path
      .extension()
      .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
      .unwrap_or_default();
    match ext.as_str() {
      "json" => Ok(Self::Json),
      "yaml" | "yml" => Ok(Self::Yaml),
      _ => Err(ConfigError::UnknownFormat(path.to_path_buf())),
    }
  }

  /// Canonical file extension, without the dot.
  pub fn extension(&self) -> &'static str {
    match self {
      Self::Json => "json",
      Self::Yaml => "yaml",
    }
  }

  /// Parse raw fields without normalizing them.
  pub fn parse_fields(&self, text: &str) -> Result<BuildConfigFields, ConfigError> {
    let fields = match self {
      Self::Json => serde_json::from_str(text)?,
      Self::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(fields)
  }
}

impl fmt::Display for ConfigFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.extension())
  }
}

impl BuildConfig {
  /// Serialize into the given encoding.
  pub fn to_string_as(&self, format: ConfigFormat) -> Result<String, ConfigError> {
    let text = match format {
      ConfigFormat::Json => serde_json::to_string_pretty(self)?,
      ConfigFormat::Yaml => serde_yaml::to_string(self)?,
    };
    Ok(text)
  }

  /// Deserialize and normalize, exactly as [`BuildConfig::new`] would.
  pub fn from_str_as(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
    format.parse_fields(text).map(BuildConfig::new)
  }

  /// Load a config file, choosing the encoding by extension.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    debug!(path = %path.display(), "loading build config");
    BuildConfigFields::load(path).map(BuildConfig::new)
  }

  /// Save to a config file, choosing the encoding by extension.
  pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
    self.save_as(path, ConfigFormat::from_path(path)?)
  }

  /// Save to a config file in an explicit encoding.
  pub fn save_as(&self, path: &Path, format: ConfigFormat) -> Result<(), ConfigError> {
    let text = self.to_string_as(format)?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), %format, "saved build config");
    Ok(())
  }
}
