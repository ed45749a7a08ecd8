//! Implementation of the `p2e build` command.
//!
//! Resolves a configuration from the command line (optionally layered over a
//! configuration file), runs the orchestrator on a blocking worker and cancels
//! it on Ctrl-C.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::debug;

use p2e_lib::{BuildConfig, BuildConfigFields, BuildReport, DataMapping, Orchestrator, format_size};

use super::print_config;
use crate::output::{Level, field, format_elapsed, log_line, status};

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Python script to package (.py or .pyw)
  pub script: PathBuf,

  /// Output directory (default: <script dir>/dist)
  #[arg(short, long, value_name = "DIR")]
  pub output: Option<PathBuf>,

  /// Executable name (default: script file stem)
  #[arg(short, long)]
  pub name: Option<String>,

  /// Produce a directory bundle instead of a single file
  #[arg(long)]
  pub onedir: bool,

  /// Hide the console window
  #[arg(short, long)]
  pub windowed: bool,

  /// Icon file for the executable
  #[arg(short, long, value_name = "ICON")]
  pub icon: Option<PathBuf>,

  /// Keep PyInstaller's work directory and spec file
  #[arg(long)]
  pub no_clean: bool,

  /// Allow UPX compression
  #[arg(long)]
  pub upx: bool,

  /// Strip symbols from the executable
  #[arg(long)]
  pub strip: bool,

  /// Bundle a file, as SRC:DST
  #[arg(long = "add-file", value_name = "SRC:DST")]
  pub add_files: Vec<String>,

  /// Bundle a folder, as SRC:DST
  #[arg(long = "add-folder", value_name = "SRC:DST")]
  pub add_folders: Vec<String>,

  /// Module PyInstaller should include even if it is not detected
  #[arg(long = "hidden-import", value_name = "MODULE")]
  pub hidden_imports: Vec<String>,

  /// Proxy used when PyInstaller has to be installed
  #[arg(long, value_name = "URL")]
  pub proxy: Option<String>,

  /// Load settings from a configuration file first
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Print PyInstaller's output only after it exits
  #[arg(long)]
  pub no_stream: bool,

  /// Extra arguments passed to PyInstaller verbatim
  #[arg(last = true)]
  pub extra: Vec<String>,
}

/// Parse `SRC:DST`, splitting on the last colon so drive letters survive.
fn parse_mapping(spec: &str) -> Option<DataMapping> {
  let (source, destination) = spec.rsplit_once(':')?;
  if source.trim().is_empty() || destination.trim().is_empty() {
    return None;
  }
  Some(DataMapping::new(source.trim(), destination.trim()))
}

fn parse_mappings(specs: &[String], kind: &str) -> Vec<DataMapping> {
  specs
    .iter()
    .filter_map(|spec| {
      let mapping = parse_mapping(spec);
      if mapping.is_none() {
        status(Level::Warning, &format!("Skipping invalid {kind} spec '{spec}', expected SRC:DST"));
      }
      mapping
    })
    .collect()
}

/// Command-line flags only ever move a setting away from its default, so they
/// are applied on top of whatever the configuration file said.
fn resolve_config(args: &BuildArgs) -> Result<BuildConfig> {
  let mut fields = match &args.config {
    Some(path) => {
      let mut fields = BuildConfigFields::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
      fields.script_path = args.script.clone();
      fields
    }
    None => BuildConfigFields::new(&args.script),
  };

  if let Some(output) = &args.output {
    fields.output_dir = Some(output.clone());
  }
  if let Some(name) = &args.name {
    fields.exe_name = Some(name.clone());
  }
  if args.onedir {
    fields.one_file = false;
  }
  if args.windowed {
    fields.windowed = true;
  }
  if let Some(icon) = &args.icon {
    fields.icon_path = Some(icon.clone());
  }
  if args.no_clean {
    fields.clean_build = false;
  }
  if args.upx {
    fields.upx_compress = true;
  }
  if args.strip {
    fields.strip_symbols = true;
  }
  fields.additional_files.extend(parse_mappings(&args.add_files, "file"));
  fields.additional_folders.extend(parse_mappings(&args.add_folders, "folder"));
  fields.hidden_imports.extend(args.hidden_imports.iter().cloned());
  if let Some(proxy) = &args.proxy {
    fields.use_proxy = true;
    fields.proxy_url = Some(proxy.clone());
  }
  fields.extra_args.extend(args.extra.iter().cloned());

  Ok(BuildConfig::new(fields))
}

/// Run the build on a blocking worker, cancelling it if Ctrl-C arrives first.
async fn run_until_interrupted(orchestrator: Arc<Orchestrator>, stream: bool) -> Result<BuildReport> {
  let mut worker = {
    let orchestrator = Arc::clone(&orchestrator);
    tokio::task::spawn_blocking(move || orchestrator.run_build(stream))
  };

  tokio::select! {
    report = &mut worker => report.context("Build task panicked"),
    Ok(()) = tokio::signal::ctrl_c() => {
      status(Level::Warning, "Interrupted, cancelling build...");
      tokio::task::spawn_blocking(move || orchestrator.cancel())
        .await
        .context("Cancel task panicked")?;
      worker.await.context("Build task panicked")
    }
  }
}

/// Execute the build command.
pub fn cmd_build(args: BuildArgs) -> Result<()> {
  let config = resolve_config(&args)?;
  print_config(&config);
  println!();

  let orchestrator = Arc::new(Orchestrator::new(config, log_line));
  debug!(command = ?orchestrator.compute_command(), "resolved build command");

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(run_until_interrupted(Arc::clone(&orchestrator), !args.no_stream))?;
  let elapsed = started.elapsed();

  println!();
  match report.artifact {
    Some(artifact) if report.error.is_none() => {
      let artifact = dunce::canonicalize(&artifact).unwrap_or(artifact);
      status(Level::Success, &format!("Build complete in {}", format_elapsed(elapsed)));
      field("Executable", artifact.display());
      if let Ok(metadata) = fs::metadata(&artifact) {
        field("Size", format_size(metadata.len()));
      }
      Ok(())
    }
    _ => {
      let reason = report
        .error
        .map(|err| err.to_string())
        .unwrap_or_else(|| format!("ended in state {}", report.status));
      status(Level::Error, &format!("Build failed: {}", reason));
      bail!("build did not complete");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[derive(Parser)]
  struct Harness {
    #[command(flatten)]
    args: BuildArgs,
  }

  fn parse(argv: &[&str]) -> BuildArgs {
    Harness::parse_from(std::iter::once("p2e").chain(argv.iter().copied())).args
  }

  #[test]
  fn mapping_splits_on_last_colon() {
    assert_eq!(parse_mapping("data.csv:data.csv"), Some(DataMapping::new("data.csv", "data.csv")));
    assert_eq!(parse_mapping("C:\\assets:assets"), Some(DataMapping::new("C:\\assets", "assets")));
  }

  #[test]
  fn mapping_rejects_malformed() {
    assert_eq!(parse_mapping("no-separator"), None);
    assert_eq!(parse_mapping(":dst"), None);
    assert_eq!(parse_mapping("src:"), None);
  }

  #[test]
  fn flags_reach_config() {
    let args = parse(&[
      "/proj/app.py",
      "--onedir",
      "--windowed",
      "--no-clean",
      "--add-file",
      "data.csv:data.csv",
      "--add-file",
      "broken",
      "--hidden-import",
      "numpy",
      "--proxy",
      "http://proxy:8080",
      "--",
      "--log-level",
      "DEBUG",
    ]);
    let config = resolve_config(&args).unwrap();

    assert_eq!(config.bundle_mode(), p2e_lib::BundleMode::Directory);
    assert!(config.is_windowed());
    assert!(!config.clean_build());
    assert_eq!(config.additional_files(), [DataMapping::new("data.csv", "data.csv")]);
    assert_eq!(config.hidden_imports(), ["numpy"]);
    assert_eq!(config.proxy(), Some("http://proxy:8080"));
    assert_eq!(config.extra_args(), ["--log-level", "DEBUG"]);
  }

  #[test]
  fn command_line_overrides_config_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let file = temp.path().join("build.yaml");
    fs::write(
      &file,
      "script_path: /elsewhere/old.py\nexe_name: FromFile\none_file: false\nhidden_imports: [requests]\n",
    )
    .unwrap();

    let args = parse(&["/proj/app.py", "--config", file.to_str().unwrap(), "-n", "Cli"]);
    let config = resolve_config(&args).unwrap();

    assert!(config.script_path().ends_with("app.py"));
    assert_eq!(config.exe_name(), "Cli");
    assert_eq!(config.bundle_mode(), p2e_lib::BundleMode::Directory);
    assert_eq!(config.hidden_imports(), ["requests"]);
  }
}
