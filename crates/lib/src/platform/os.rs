use std::fmt;

/// Operating system variants p2e knows how to package for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
    }
  }

  /// Suffix PyInstaller appends to the produced executable.
  pub fn exe_suffix(&self) -> &'static str {
    match self {
      Self::Windows => ".exe",
      Self::Linux | Self::MacOs => "",
    }
  }

  /// Separator between source and destination in an `--add-data` value.
  ///
  /// PyInstaller follows the platform's path-list separator.
  pub fn data_separator(&self) -> char {
    match self {
      Self::Windows => ';',
      Self::Linux | Self::MacOs => ':',
    }
  }

  /// Icon extensions PyInstaller accepts on this OS, lowercase, without the dot.
  pub fn icon_extensions(&self) -> &'static [&'static str] {
    match self {
      Self::MacOs => &["icns", "ico"],
      Self::Linux | Self::Windows => &["ico"],
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Returns the current operating system
///
/// Returns `None` if the OS is not supported
pub fn os() -> Option<Os> {
  Os::current()
}
