//! p2e-lib: Core types and logic for p2e
//!
//! This crate drives PyInstaller on behalf of a front-end:
//! - `BuildConfig`: normalized description of one build request (JSON/YAML round-trippable)
//! - `Orchestrator`: the dependency check, build, cleanup and verification state machine
//! - `Toolchain`: how the Python interpreter, pip and PyInstaller are reached

pub mod build;
pub mod config;
pub mod consts;
pub mod platform;
pub mod util;
pub mod validate;

pub use build::{BuildError, BuildReport, BuildStatus, LogSink, Orchestrator, Toolchain};
pub use config::{BuildConfig, BuildConfigFields, BundleMode, ConfigError, ConfigFormat, DataMapping};
pub use util::format_size;
