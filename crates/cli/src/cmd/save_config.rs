//! Implementation of the `p2e save-config` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

use p2e_lib::{BuildConfig, ConfigFormat};

use crate::output::{Level, status};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
  Json,
  Yaml,
}

impl From<FormatArg> for ConfigFormat {
  fn from(arg: FormatArg) -> Self {
    match arg {
      FormatArg::Json => ConfigFormat::Json,
      FormatArg::Yaml => ConfigFormat::Yaml,
    }
  }
}

/// Decide the format and final path. An explicit format wins; otherwise the
/// extension decides, and a bare name gets `.json`.
fn resolve_target(output: &Path, format: Option<FormatArg>) -> Result<(PathBuf, ConfigFormat)> {
  let has_extension = output.extension().is_some();
  let format = match format {
    Some(arg) => ConfigFormat::from(arg),
    None if has_extension => ConfigFormat::from_path(output)?,
    None => ConfigFormat::Json,
  };

  let path = if has_extension {
    output.to_path_buf()
  } else {
    output.with_extension(format.extension())
  };
  Ok((path, format))
}

pub fn cmd_save_config(script: &Path, output: &Path, format: Option<FormatArg>) -> Result<()> {
  let (path, format) = resolve_target(output, format)?;
  let config = BuildConfig::for_script(script);

  config
    .save_as(&path, format)
    .with_context(|| format!("Failed to save configuration to {}", path.display()))?;

  status(Level::Success, &format!("Configuration saved to {}", path.display()));
  if let Err(err) = config.validate() {
    status(Level::Warning, &format!("Configuration does not validate yet: {}", err));
  }
  Ok(())
}
