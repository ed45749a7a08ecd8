//! Platform-specific conventions of the packaging tool.
//!
//! Everything here falls back to Unix conventions when the running OS is not
//! one PyInstaller supports.

pub mod os;

pub use os::{Os, os};

fn current_or_linux() -> Os {
  Os::current().unwrap_or(Os::Linux)
}

/// Suffix of the executable PyInstaller produces on this system.
pub fn exe_suffix() -> &'static str {
  current_or_linux().exe_suffix()
}

/// Separator joining source and destination in `--add-data`.
pub fn data_separator() -> char {
  current_or_linux().data_separator()
}

/// Icon extensions accepted on this system.
pub fn icon_extensions() -> &'static [&'static str] {
  current_or_linux().icon_extensions()
}
