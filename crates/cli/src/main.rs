mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{BuildArgs, FormatArg};

/// p2e - Package Python scripts into standalone executables with PyInstaller
#[derive(Parser)]
#[command(name = "p2e")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build an executable from a Python script
  Build(BuildArgs),

  /// Write a default build configuration for a script
  SaveConfig {
    /// Python script the configuration builds
    script: PathBuf,

    /// Where to write the configuration (extension added if missing)
    output: PathBuf,

    /// File format (default: from the extension, else json)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
  },

  /// Load a configuration file and print the normalized result
  ShowConfig {
    /// Configuration file (.json, .yaml or .yml)
    file: PathBuf,

    /// Print as JSON
    #[arg(long)]
    json: bool,
  },

  /// Show platform and interpreter information
  Info,
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match cli.command {
    Commands::Build(args) => cmd::cmd_build(args),
    Commands::SaveConfig { script, output, format } => cmd::cmd_save_config(&script, &output, format),
    Commands::ShowConfig { file, json } => cmd::cmd_show_config(&file, json),
    Commands::Info => {
      cmd::cmd_info();
      Ok(())
    }
  }
}
