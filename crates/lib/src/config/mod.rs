//! Build configuration for p2e.
//!
//! A [`BuildConfig`] is created once per build request and normalized at
//! construction:
//! - paths become absolute (relative to the process working directory)
//! - `output_dir` defaults to `dist/` beside the script
//! - `exe_name` defaults to the script's file stem
//! - `windowed` forces `console_mode` off
//! - hidden imports are de-duplicated, keeping first-seen order
//!
//! Validation is deferred to [`BuildConfig::validate`] so a configuration can
//! be built, displayed and saved before the files it names exist.
//!
//! The same normalization runs when a configuration is deserialized, so
//! loading a saved file is equivalent to constructing it directly.

mod error;
mod format;

pub use error::ConfigError;
pub use format::ConfigFormat;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_DIST_DIR;
use crate::validate::{validate_icon, validate_script};

/// Whether PyInstaller collapses everything into one binary or a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleMode {
  SingleFile,
  Directory,
}

impl BundleMode {
  pub fn from_one_file(one_file: bool) -> Self {
    if one_file { Self::SingleFile } else { Self::Directory }
  }

  /// The PyInstaller flag selecting this mode.
  pub fn flag(&self) -> &'static str {
    match self {
      Self::SingleFile => "--onefile",
      Self::Directory => "--onedir",
    }
  }
}

/// An extra resource embedded into the bundle.
///
/// Serialized as a two-element list `[source, destination]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct DataMapping {
  /// File or folder on disk, resolved by PyInstaller relative to the script directory.
  pub source: String,
  /// Destination inside the bundle, relative to its root.
  pub destination: String,
}

impl DataMapping {
  pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      destination: destination.into(),
    }
  }

  /// Joins source and destination the way `--add-data` expects.
  pub fn to_arg(&self, separator: char) -> String {
    format!("{}{}{}", self.source, separator, self.destination)
  }
}

impl From<(String, String)> for DataMapping {
  fn from((source, destination): (String, String)) -> Self {
    Self { source, destination }
  }
}

impl From<DataMapping> for (String, String) {
  fn from(mapping: DataMapping) -> Self {
    (mapping.source, mapping.destination)
  }
}

fn default_true() -> bool {
  true
}

/// Raw, un-normalized build options as a front-end or config file supplies them.
///
/// Every field except `script_path` may be absent from a config file and then
/// takes the same default as [`BuildConfigFields::new`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfigFields {
  pub script_path: PathBuf,
  #[serde(default)]
  pub output_dir: Option<PathBuf>,
  #[serde(default)]
  pub exe_name: Option<String>,
  #[serde(default = "default_true")]
  pub one_file: bool,
  #[serde(default = "default_true")]
  pub console_mode: bool,
  #[serde(default)]
  pub windowed: bool,
  #[serde(default = "default_true")]
  pub clean_build: bool,
  #[serde(default)]
  pub icon_path: Option<PathBuf>,
  #[serde(default)]
  pub upx_compress: bool,
  #[serde(default)]
  pub strip_symbols: bool,
  #[serde(default)]
  pub additional_files: Vec<DataMapping>,
  #[serde(default)]
  pub additional_folders: Vec<DataMapping>,
  #[serde(default)]
  pub hidden_imports: Vec<String>,
  #[serde(default)]
  pub use_proxy: bool,
  #[serde(default)]
  pub proxy_url: Option<String>,
  #[serde(default)]
  pub extra_args: Vec<String>,
}

impl BuildConfigFields {
  /// Default options for the given script.
  pub fn new(script_path: impl Into<PathBuf>) -> Self {
    Self {
      script_path: script_path.into(),
      output_dir: None,
      exe_name: None,
      one_file: true,
      console_mode: true,
      windowed: false,
      clean_build: true,
      icon_path: None,
      upx_compress: false,
      strip_symbols: false,
      additional_files: Vec::new(),
      additional_folders: Vec::new(),
      hidden_imports: Vec::new(),
      use_proxy: false,
      proxy_url: None,
      extra_args: Vec::new(),
    }
  }

  /// Read raw fields from a JSON or YAML file, chosen by extension.
  ///
  /// Front-ends that override individual fields before normalizing use this
  /// instead of [`BuildConfig::load`], so derived defaults follow the override.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    format.parse_fields(&text)
  }
}

impl From<BuildConfig> for BuildConfigFields {
  fn from(config: BuildConfig) -> Self {
    Self {
      script_path: config.script_path,
      output_dir: Some(config.output_dir),
      exe_name: Some(config.exe_name),
      one_file: config.one_file,
      console_mode: config.console_mode,
      windowed: config.windowed,
      clean_build: config.clean_build,
      icon_path: config.icon_path,
      upx_compress: config.upx_compress,
      strip_symbols: config.strip_symbols,
      additional_files: config.additional_files,
      additional_folders: config.additional_folders,
      hidden_imports: config.hidden_imports,
      use_proxy: config.use_proxy,
      proxy_url: config.proxy_url,
      extra_args: config.extra_args,
    }
  }
}

/// A normalized build request. Fixed input to one build attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BuildConfigFields")]
pub struct BuildConfig {
  script_path: PathBuf,
  output_dir: PathBuf,
  exe_name: String,
  one_file: bool,
  console_mode: bool,
  windowed: bool,
  clean_build: bool,
  icon_path: Option<PathBuf>,
  upx_compress: bool,
  strip_symbols: bool,
  additional_files: Vec<DataMapping>,
  additional_folders: Vec<DataMapping>,
  hidden_imports: Vec<String>,
  use_proxy: bool,
  proxy_url: Option<String>,
  extra_args: Vec<String>,
}

impl From<BuildConfigFields> for BuildConfig {
  fn from(fields: BuildConfigFields) -> Self {
    Self::new(fields)
  }
}

impl BuildConfig {
  /// Normalize raw fields. Never fails; see [`BuildConfig::validate`].
  pub fn new(fields: BuildConfigFields) -> Self {
    let script_path = absolutize(&fields.script_path);

    let output_dir = match fields.output_dir.filter(|dir| !dir.as_os_str().is_empty()) {
      Some(dir) => absolutize(&dir),
      None => absolutize(parent_dir(&script_path)).join(DEFAULT_DIST_DIR),
    };

    let exe_name = match fields.exe_name.filter(|name| !name.trim().is_empty()) {
      Some(name) => name,
      None => script_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default(),
    };

    let icon_path = fields
      .icon_path
      .filter(|icon| !icon.as_os_str().is_empty())
      .map(|icon| absolutize(&icon));

    let mut hidden_imports: Vec<String> = Vec::with_capacity(fields.hidden_imports.len());
    for module in fields.hidden_imports {
      let module = module.trim();
      if !module.is_empty() && !hidden_imports.iter().any(|seen| seen == module) {
        hidden_imports.push(module.to_string());
      }
    }

    Self {
      script_path,
      output_dir,
      exe_name,
      one_file: fields.one_file,
      console_mode: fields.console_mode && !fields.windowed,
      windowed: fields.windowed,
      clean_build: fields.clean_build,
      icon_path,
      upx_compress: fields.upx_compress,
      strip_symbols: fields.strip_symbols,
      additional_files: fields.additional_files,
      additional_folders: fields.additional_folders,
      hidden_imports,
      use_proxy: fields.use_proxy,
      proxy_url: fields.proxy_url.filter(|url| !url.trim().is_empty()),
      extra_args: fields.extra_args,
    }
  }

  /// Configuration with every option at its default.
  pub fn for_script(script_path: impl Into<PathBuf>) -> Self {
    Self::new(BuildConfigFields::new(script_path))
  }

  /// Check that the script and icon exist and carry the right extensions.
  pub fn validate(&self) -> Result<(), ConfigError> {
    validate_script(&self.script_path)?;
    if let Some(icon) = &self.icon_path {
      validate_icon(icon)?;
    }
    Ok(())
  }

  pub fn script_path(&self) -> &Path {
    &self.script_path
  }

  /// Directory containing the script; the packaging tool runs here.
  pub fn script_dir(&self) -> &Path {
    parent_dir(&self.script_path)
  }

  pub fn output_dir(&self) -> &Path {
    &self.output_dir
  }

  pub fn exe_name(&self) -> &str {
    &self.exe_name
  }

  pub fn bundle_mode(&self) -> BundleMode {
    BundleMode::from_one_file(self.one_file)
  }

  pub fn console_mode(&self) -> bool {
    self.console_mode
  }

  pub fn is_windowed(&self) -> bool {
    self.windowed || !self.console_mode
  }

  pub fn clean_build(&self) -> bool {
    self.clean_build
  }

  pub fn icon_path(&self) -> Option<&Path> {
    self.icon_path.as_deref()
  }

  pub fn upx_compress(&self) -> bool {
    self.upx_compress
  }

  pub fn strip_symbols(&self) -> bool {
    self.strip_symbols
  }

  pub fn additional_files(&self) -> &[DataMapping] {
    &self.additional_files
  }

  pub fn additional_folders(&self) -> &[DataMapping] {
    &self.additional_folders
  }

  pub fn hidden_imports(&self) -> &[String] {
    &self.hidden_imports
  }

  /// Proxy URL for dependency installation, when enabled and set.
  pub fn proxy(&self) -> Option<&str> {
    if self.use_proxy { self.proxy_url.as_deref() } else { None }
  }

  pub fn extra_args(&self) -> &[String] {
    &self.extra_args
  }
}

fn absolutize(path: &Path) -> PathBuf {
  if path.as_os_str().is_empty() {
    return PathBuf::new();
  }
  std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn parent_dir(path: &Path) -> &Path {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn write_script(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "print('hello')").unwrap();
    path
  }

  #[test]
  fn defaults_derive_from_script() {
    let temp = TempDir::new().unwrap();
    let script = write_script(temp.path(), "test.py");

    let config = BuildConfig::for_script(&script);

    assert_eq!(config.script_path(), script);
    assert_eq!(config.exe_name(), "test");
    assert_eq!(config.output_dir(), temp.path().join("dist"));
    assert_eq!(config.bundle_mode(), BundleMode::SingleFile);
    assert!(config.console_mode());
    assert!(config.clean_build());
    assert!(config.proxy().is_none());
  }

  #[cfg(unix)]
  #[test]
  fn defaults_for_absolute_script() {
    let config = BuildConfig::for_script("/proj/app.py");

    assert_eq!(config.output_dir(), Path::new("/proj/dist"));
    assert_eq!(config.exe_name(), "app");
    assert_eq!(config.script_dir(), Path::new("/proj"));
  }

  #[test]
  fn relative_script_becomes_absolute() {
    let config = BuildConfig::for_script("app.py");

    assert!(config.script_path().is_absolute());
    assert!(config.output_dir().is_absolute());
    assert!(config.output_dir().ends_with("dist"));
  }

  #[test]
  fn windowed_forces_console_off() {
    let mut fields = BuildConfigFields::new("/proj/app.py");
    fields.windowed = true;
    fields.console_mode = true;

    let config = BuildConfig::new(fields);

    assert!(!config.console_mode());
    assert!(config.is_windowed());
  }

  #[test]
  fn explicit_output_and_name_are_kept() {
    let temp = TempDir::new().unwrap();
    let mut fields = BuildConfigFields::new(temp.path().join("main.py"));
    fields.output_dir = Some(temp.path().join("out"));
    fields.exe_name = Some("MyApp".to_string());

    let config = BuildConfig::new(fields);

    assert_eq!(config.output_dir(), temp.path().join("out"));
    assert_eq!(config.exe_name(), "MyApp");
  }

  #[test]
  fn blank_name_falls_back_to_stem() {
    let mut fields = BuildConfigFields::new("/proj/tool.py");
    fields.exe_name = Some("  ".to_string());

    assert_eq!(BuildConfig::new(fields).exe_name(), "tool");
  }

  #[test]
  fn hidden_imports_are_deduplicated_in_order() {
    let mut fields = BuildConfigFields::new("/proj/app.py");
    fields.hidden_imports = vec!["numpy".into(), "pandas".into(), "numpy".into(), " ".into()];

    let config = BuildConfig::new(fields);

    assert_eq!(config.hidden_imports(), ["numpy", "pandas"]);
  }

  #[test]
  fn proxy_requires_flag_and_url() {
    let mut fields = BuildConfigFields::new("/proj/app.py");
    fields.proxy_url = Some("http://proxy:8080".into());
    assert!(BuildConfig::new(fields.clone()).proxy().is_none());

    fields.use_proxy = true;
    assert_eq!(BuildConfig::new(fields.clone()).proxy(), Some("http://proxy:8080"));

    fields.proxy_url = Some(String::new());
    assert!(BuildConfig::new(fields).proxy().is_none());
  }

  #[test]
  fn validate_accepts_existing_script() {
    let temp = TempDir::new().unwrap();
    let script = write_script(temp.path(), "ok.py");

    BuildConfig::for_script(script).validate().unwrap();
  }

  #[test]
  fn validate_rejects_missing_script() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfig::for_script(temp.path().join("nonexistent.py"));

    assert!(matches!(config.validate(), Err(ConfigError::ScriptNotFound(_))));
  }

  #[test]
  fn validate_rejects_wrong_extension() {
    let temp = TempDir::new().unwrap();
    let script = write_script(temp.path(), "test.txt");

    let err = BuildConfig::for_script(script).validate().unwrap_err();

    assert!(matches!(err, ConfigError::InvalidScriptExtension(_)));
    assert!(err.is_validation());
  }

  #[test]
  fn validate_rejects_missing_icon() {
    let temp = TempDir::new().unwrap();
    let mut fields = BuildConfigFields::new(write_script(temp.path(), "app.py"));
    fields.icon_path = Some(temp.path().join("missing.ico"));

    let result = BuildConfig::new(fields).validate();

    assert!(matches!(result, Err(ConfigError::IconNotFound(_))));
  }

  #[test]
  fn from_fields_round_trips() {
    let temp = TempDir::new().unwrap();
    let mut fields = BuildConfigFields::new(temp.path().join("app.py"));
    fields.windowed = true;
    fields.additional_files = vec![DataMapping::new("data.csv", "data.csv")];
    let config = BuildConfig::new(fields);

    let again = BuildConfig::new(BuildConfigFields::from(config.clone()));

    assert_eq!(again, config);
  }

  #[test]
  fn data_mapping_joins_with_separator() {
    let mapping = DataMapping::new("assets", "assets/img");
    assert_eq!(mapping.to_arg(':'), "assets:assets/img");
    assert_eq!(mapping.to_arg(';'), "assets;assets/img");
  }
}
