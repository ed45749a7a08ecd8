/// Application name, used in user-facing messages.
pub const APP_NAME: &str = "p2e";

/// Environment variable that overrides the Python interpreter used for pip and PyInstaller.
pub const PYTHON_ENV: &str = "P2E_PYTHON";

/// Distribution name of the packaging tool, as pip knows it.
pub const PACKAGE_NAME: &str = "pyinstaller";

/// Module name of the packaging tool, as `python -m` knows it.
pub const MODULE_NAME: &str = "PyInstaller";

/// Directory created beside the script when no output directory is given.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// PyInstaller's intermediate work directory, relative to the script directory.
pub const WORK_DIR: &str = "build";

/// Extension of the build descriptor PyInstaller writes beside the script.
pub const SPEC_EXTENSION: &str = "spec";
