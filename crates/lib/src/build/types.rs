//! Types for build orchestration.
//!
//! This module defines the orchestrator's status enum, its error taxonomy and
//! the report returned from a build attempt.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Receives one line of build log per call.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Phase of a build attempt.
///
/// `Complete` and `Failed` are terminal: once reached, the status never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
  Idle,
  CheckingDependencies,
  InstallingDependencies,
  Building,
  Cleaning,
  Complete,
  Failed,
}

impl BuildStatus {
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Complete | Self::Failed)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Idle => "idle",
      Self::CheckingDependencies => "checking_dependencies",
      Self::InstallingDependencies => "installing_dependencies",
      Self::Building => "building",
      Self::Cleaning => "cleaning",
      Self::Complete => "complete",
      Self::Failed => "failed",
    }
  }
}

impl fmt::Display for BuildStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Renders an exit code, which is absent when the process died from a signal.
pub(crate) fn describe_code(code: &Option<i32>) -> String {
  match code {
    Some(code) => code.to_string(),
    None => "none (terminated by signal)".to_string(),
  }
}

/// Why a build attempt ended in [`BuildStatus::Failed`].
#[derive(Debug, Error)]
pub enum BuildError {
  /// The configuration did not validate; nothing was run.
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  /// PyInstaller was missing and pip could not install it.
  #[error("failed to install PyInstaller (exit code {})", describe_code(.code))]
  DependencyInstall { code: Option<i32> },

  /// An external program could not be started at all.
  #[error("failed to run {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// PyInstaller exited non-zero.
  #[error("build failed with return code {}", describe_code(.code))]
  ExecutionFailed { code: Option<i32> },

  /// PyInstaller succeeded but the executable is not where it should be.
  #[error("expected output not found: {}", .path.display())]
  MissingArtifact { path: PathBuf },

  /// `run_build` was called on an orchestrator that already ran.
  #[error("build already started (status: {0})")]
  AlreadyStarted(BuildStatus),

  /// The build was stopped through [`crate::Orchestrator::cancel`].
  #[error("build cancelled")]
  Cancelled,

  /// I/O failure while supervising the child process.
  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

impl BuildError {
  /// Verification failures are reported as warnings: the tool ran fine but
  /// its output landed somewhere unexpected.
  pub fn is_warning(&self) -> bool {
    matches!(self, Self::MissingArtifact { .. })
  }
}

/// Outcome of [`crate::Orchestrator::run_build`].
#[derive(Debug)]
pub struct BuildReport {
  /// Terminal status the orchestrator ended in.
  pub status: BuildStatus,
  /// The verified executable, on success.
  pub artifact: Option<PathBuf>,
  /// What went wrong, on failure.
  pub error: Option<BuildError>,
}

impl BuildReport {
  pub fn is_success(&self) -> bool {
    self.status == BuildStatus::Complete && self.error.is_none()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_complete_and_failed_are_terminal() {
    let all = [
      BuildStatus::Idle,
      BuildStatus::CheckingDependencies,
      BuildStatus::InstallingDependencies,
      BuildStatus::Building,
      BuildStatus::Cleaning,
      BuildStatus::Complete,
      BuildStatus::Failed,
    ];
    for status in all {
      let expected = match status {
        BuildStatus::Complete | BuildStatus::Failed => true,
        BuildStatus::Idle
        | BuildStatus::CheckingDependencies
        | BuildStatus::InstallingDependencies
        | BuildStatus::Building
        | BuildStatus::Cleaning => false,
      };
      assert_eq!(status.is_terminal(), expected, "{status}");
    }
  }

  #[test]
  fn status_serializes_snake_case() {
    let json = serde_json::to_string(&BuildStatus::CheckingDependencies).unwrap();
    assert_eq!(json, "\"checking_dependencies\"");
  }

  #[test]
  fn exit_code_in_message() {
    let err = BuildError::ExecutionFailed { code: Some(1) };
    assert_eq!(err.to_string(), "build failed with return code 1");

    let err = BuildError::ExecutionFailed { code: None };
    assert!(err.to_string().contains("signal"));
  }

  #[test]
  fn only_missing_artifact_is_warning() {
    assert!(BuildError::MissingArtifact { path: PathBuf::from("x") }.is_warning());
    assert!(!BuildError::Cancelled.is_warning());
  }

  #[test]
  fn already_started_names_status() {
    let err = BuildError::AlreadyStarted(BuildStatus::Complete);
    assert_eq!(err.to_string(), "build already started (status: complete)");
  }
}
