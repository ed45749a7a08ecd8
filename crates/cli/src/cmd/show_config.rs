//! Implementation of the `p2e show-config` command.

use std::path::Path;

use anyhow::{Context, Result};

use p2e_lib::BuildConfig;

use super::print_config;
use crate::output::{Level, print_json, status};

pub fn cmd_show_config(file: &Path, json: bool) -> Result<()> {
  let config =
    BuildConfig::load(file).with_context(|| format!("Failed to load configuration from {}", file.display()))?;

  if json {
    return print_json(&config);
  }

  print_config(&config);
  println!();
  match config.validate() {
    Ok(()) => status(Level::Success, "Configuration is valid"),
    Err(err) => status(Level::Warning, &format!("Configuration is not valid: {}", err)),
  }
  Ok(())
}
