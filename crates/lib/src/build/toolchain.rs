//! The Python interpreter and the pip / PyInstaller modules reached through it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::consts::{MODULE_NAME, PACKAGE_NAME, PYTHON_ENV};

#[cfg(windows)]
const DEFAULT_PYTHON: &str = "python";

#[cfg(not(windows))]
const DEFAULT_PYTHON: &str = "python3";

/// Locates the interpreter used to check for, install and run PyInstaller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
  python: PathBuf,
  /// Arguments placed before `-m`, e.g. `-3` for the Windows `py` launcher.
  launcher_args: Vec<OsString>,
}

impl Default for Toolchain {
  fn default() -> Self {
    Self::from_env()
  }
}

impl Toolchain {
  pub fn new(python: impl Into<PathBuf>) -> Self {
    Self {
      python: python.into(),
      launcher_args: Vec::new(),
    }
  }

  /// Interpreter from `P2E_PYTHON`, or the platform default on `PATH`.
  pub fn from_env() -> Self {
    let python = std::env::var_os(PYTHON_ENV)
      .filter(|value| !value.is_empty())
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON));
    Self::new(python)
  }

  pub fn with_launcher_args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    self.launcher_args = args.into_iter().map(Into::into).collect();
    self
  }

  pub fn python(&self) -> &Path {
    &self.python
  }

  fn module_command(&self, module: &str) -> Command {
    let mut command = Command::new(&self.python);
    command.args(&self.launcher_args).arg("-m").arg(module).stdin(Stdio::null());
    command
  }

  /// `python -m pip show pyinstaller`; exit code 0 means installed.
  pub fn check_command(&self) -> Command {
    let mut command = self.module_command("pip");
    command.args(["show", PACKAGE_NAME]);
    command
  }

  /// `python -m pip install pyinstaller [--proxy URL]`.
  pub fn install_command(&self, proxy: Option<&str>) -> Command {
    let mut command = self.module_command("pip");
    command.args(["install", PACKAGE_NAME]);
    if let Some(url) = proxy {
      command.args(["--proxy", url]);
    }
    command
  }

  /// Tokens that start every PyInstaller invocation.
  pub fn build_prefix(&self) -> Vec<String> {
    let mut prefix = vec![self.python.to_string_lossy().into_owned()];
    prefix.extend(self.launcher_args.iter().map(|arg| arg.to_string_lossy().into_owned()));
    prefix.push("-m".to_string());
    prefix.push(MODULE_NAME.to_string());
    prefix
  }

  /// `python -m PyInstaller <args>`.
  pub fn build_command(&self, args: &[String]) -> Command {
    let mut command = self.module_command(MODULE_NAME);
    command.args(args);
    command
  }
}
