use p2e_lib::Toolchain;
use p2e_lib::consts::{APP_NAME, PYTHON_ENV};
use p2e_lib::platform::{data_separator, exe_suffix, os};

use crate::output::{Level, field, status};

pub fn cmd_info() {
  status(Level::Info, &format!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION")));
  match os() {
    Some(os) => field("Platform", os),
    None => field("Platform", "unsupported"),
  }
  let suffix = if exe_suffix().is_empty() { "(none)" } else { exe_suffix() };
  field("Executable suffix", suffix);
  field("Data separator", data_separator());

  let toolchain = Toolchain::from_env();
  let source = if std::env::var_os(PYTHON_ENV).is_some_and(|v| !v.is_empty()) {
    PYTHON_ENV
  } else {
    "default"
  };
  field("Python", format!("{} ({})", toolchain.python().display(), source));
}
