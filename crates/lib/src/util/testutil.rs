//! Test utilities for p2e-lib.
//!
//! Helpers for tests that spawn processes or need a stand-in for the Python
//! interpreter.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::build::{LogSink, Toolchain};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Collects every line handed to a log sink.
#[derive(Clone, Default)]
pub struct LogCapture {
  lines: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
  pub fn sink(&self) -> LogSink {
    let lines = Arc::clone(&self.lines);
    Arc::new(move |line: &str| lines.lock().unwrap().push(line.to_string()))
  }

  pub fn lines(&self) -> Vec<String> {
    self.lines.lock().unwrap().clone()
  }

  /// True if any captured line contains `needle`.
  pub fn contains(&self, needle: &str) -> bool {
    self.lines.lock().unwrap().iter().any(|line| line.contains(needle))
  }
}

/// Bodies for the `PyInstaller` branch of [`FakePython`]. They see the
/// PyInstaller arguments as `$@`.
pub mod build_body {
  /// Prints three lines (one on stderr), leaves PyInstaller's work files and
  /// writes the executable where `--distpath`/`--name`/`--onedir` say.
  pub const SUCCEED: &str = r#"dist=dist
name=app
onedir=0
while [ $# -gt 0 ]; do
  case "$1" in
    --distpath) dist="$2"; shift ;;
    --name) name="$2"; shift ;;
    --onedir) onedir=1 ;;
  esac
  shift
done
echo "line one"
echo "line two" 1>&2
echo "line three"
mkdir -p build
touch "$name.spec"
if [ "$onedir" = 1 ]; then
  mkdir -p "$dist/$name"
  printf 'binary' > "$dist/$name/$name"
else
  mkdir -p "$dist"
  printf 'binary' > "$dist/$name"
fi
exit 0"#;

  pub const FAIL: &str = "echo \"compile error\" 1>&2\nexit 1";

  pub const NO_ARTIFACT: &str = "echo \"nothing written\"\nexit 0";

  pub const HANG: &str = "echo started\nexec sleep 30";

  /// Keeps a helper process alive instead of replacing the shell.
  pub const HANG_WITH_HELPER: &str = "echo started\nsleep 30\nexit 0";
}

/// A shell script standing in for `python -m pip` and `python -m PyInstaller`.
pub struct FakePython {
  /// Exit code of `pip show pyinstaller`.
  pub check_exit: i32,
  /// Exit code of `pip install`; the pip arguments are echoed first.
  pub install_exit: i32,
  pub build: String,
}

impl Default for FakePython {
  fn default() -> Self {
    Self {
      check_exit: 0,
      install_exit: 0,
      build: build_body::SUCCEED.to_string(),
    }
  }
}

impl FakePython {
  pub fn script(&self) -> String {
    format!(
      r#"module="$2"
shift 2
case "$module" in
  pip)
    case "$1" in
      show) exit {check} ;;
      install) echo "pip $*"; exit {install} ;;
    esac
    exit 2
    ;;
  PyInstaller)
{build}
    ;;
esac
exit 2
"#,
      check = self.check_exit,
      install = self.install_exit,
      build = self.build,
    )
  }

  /// Write the script into `dir` and return a toolchain that runs it through
  /// `/bin/sh`, so the file never needs to be executable.
  pub fn install(&self, dir: &Path) -> Toolchain {
    let path = dir.join("fake_python.sh");
    fs::write(&path, self.script()).unwrap();
    Toolchain::new("/bin/sh").with_launcher_args([path])
  }
}
