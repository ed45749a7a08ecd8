//! PyInstaller argument construction and output-path prediction.
//!
//! Both are pure functions of a [`BuildConfig`], apart from the icon flag
//! which is only emitted when the icon exists on disk.

use std::path::{Path, PathBuf};

use crate::config::{BuildConfig, BundleMode};
use crate::platform::{data_separator, exe_suffix};

fn path_arg(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}

/// PyInstaller flags for `config`, script path last.
///
/// Order follows the configuration's field order so the same configuration
/// always yields the same command.
pub fn build_args(config: &BuildConfig) -> Vec<String> {
  let separator = data_separator();
  let mut args = vec!["--noconfirm".to_string(), config.bundle_mode().flag().to_string()];

  let window_flag = if config.is_windowed() { "--windowed" } else { "--console" };
  args.push(window_flag.to_string());

  if config.clean_build() {
    args.push("--clean".to_string());
  }

  args.push("--distpath".to_string());
  args.push(path_arg(config.output_dir()));
  args.push("--name".to_string());
  args.push(config.exe_name().to_string());

  if let Some(icon) = config.icon_path().filter(|icon| icon.exists()) {
    args.push("--icon".to_string());
    args.push(path_arg(icon));
  }

  // PyInstaller picks up UPX on its own when it is installed.
  if !config.upx_compress() {
    args.push("--noupx".to_string());
  }

  if config.strip_symbols() {
    args.push("--strip".to_string());
  }

  for mapping in config.additional_files().iter().chain(config.additional_folders()) {
    args.push("--add-data".to_string());
    args.push(mapping.to_arg(separator));
  }

  for module in config.hidden_imports() {
    args.push("--hidden-import".to_string());
    args.push(module.clone());
  }

  args.extend(config.extra_args().iter().cloned());

  args.push(path_arg(config.script_path()));
  args
}

/// Where the executable will be once PyInstaller succeeds.
pub fn expected_output_path(config: &BuildConfig) -> PathBuf {
  output_path_with_suffix(config, exe_suffix())
}

pub(crate) fn output_path_with_suffix(config: &BuildConfig, suffix: &str) -> PathBuf {
  let file_name = format!("{}{}", config.exe_name(), suffix);
  match config.bundle_mode() {
    BundleMode::SingleFile => config.output_dir().join(file_name),
    BundleMode::Directory => config.output_dir().join(config.exe_name()).join(file_name),
  }
}

/// Render an argument list for the log, quoting tokens that contain whitespace.
pub fn format_command(argv: &[String]) -> String {
  argv
    .iter()
    .map(|arg| {
      if arg.is_empty() || arg.chars().any(char::is_whitespace) {
        format!("\"{}\"", arg.replace('"', "\\\""))
      } else {
        arg.clone()
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}
