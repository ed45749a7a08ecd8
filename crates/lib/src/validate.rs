//! Path checks shared by configuration validation and front-ends.

use std::path::Path;

use crate::config::ConfigError;
use crate::platform::icon_extensions;

/// Extensions accepted for the entry-point script, lowercase.
pub const SCRIPT_EXTENSIONS: &[&str] = &["py", "pyw"];

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
  path
    .extension()
    .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    .is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Check that `path` is an existing, non-empty Python source file.
pub fn validate_script(path: &Path) -> Result<(), ConfigError> {
  if path.as_os_str().is_empty() {
    return Err(ConfigError::MissingScript);
  }
  let metadata = std::fs::metadata(path).map_err(|_| ConfigError::ScriptNotFound(path.to_path_buf()))?;
  if !metadata.is_file() {
    return Err(ConfigError::NotAFile(path.to_path_buf()));
  }
  if !has_extension(path, SCRIPT_EXTENSIONS) {
    return Err(ConfigError::InvalidScriptExtension(path.to_path_buf()));
  }
  if metadata.len() == 0 {
    return Err(ConfigError::EmptyScript(path.to_path_buf()));
  }
  Ok(())
}

/// Check that `path` is an existing icon file with an extension this platform accepts.
pub fn validate_icon(path: &Path) -> Result<(), ConfigError> {
  let metadata = std::fs::metadata(path).map_err(|_| ConfigError::IconNotFound(path.to_path_buf()))?;
  if !metadata.is_file() {
    return Err(ConfigError::NotAFile(path.to_path_buf()));
  }
  let allowed = icon_extensions();
  if !has_extension(path, allowed) {
    let expected = allowed.iter().map(|ext| format!(".{ext}")).collect::<Vec<_>>().join(" or ");
    return Err(ConfigError::InvalidIconExtension {
      path: path.to_path_buf(),
      expected,
    });
  }
  Ok(())
}
