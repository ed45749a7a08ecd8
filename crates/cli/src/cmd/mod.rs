mod build;
mod info;
mod save_config;
mod show_config;

pub use build::{BuildArgs, cmd_build};
pub use info::cmd_info;
pub use save_config::{FormatArg, cmd_save_config};
pub use show_config::cmd_show_config;

use p2e_lib::{BuildConfig, BundleMode};

use crate::output::{Level, field, on_off, status};

/// Print the settings a build will use.
pub(crate) fn print_config(config: &BuildConfig) {
  status(Level::Info, "Build configuration");
  field("Script", config.script_path().display());
  field("Output", config.output_dir().display());
  field("Name", config.exe_name());

  let mode = match config.bundle_mode() {
    BundleMode::SingleFile => "single file",
    BundleMode::Directory => "directory",
  };
  field("Mode", mode);
  field("Window", if config.is_windowed() { "windowed" } else { "console" });
  field("Clean", on_off(config.clean_build()));
  field("UPX", on_off(config.upx_compress()));
  field("Strip", on_off(config.strip_symbols()));

  if let Some(icon) = config.icon_path() {
    field("Icon", icon.display());
  }
  for mapping in config.additional_files().iter().chain(config.additional_folders()) {
    field("Data", format!("{} -> {}", mapping.source, mapping.destination));
  }
  if !config.hidden_imports().is_empty() {
    field("Hidden imports", config.hidden_imports().join(", "));
  }
  if let Some(proxy) = config.proxy() {
    field("Proxy", proxy);
  }
}
