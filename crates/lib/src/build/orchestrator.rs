//! The build state machine.
//!
//! One [`Orchestrator`] drives one build attempt:
//!
//! ```text
//! Idle → CheckingDependencies → [InstallingDependencies] → Building → [Cleaning] → Complete
//!                        any phase ────────────────────────────────────────────→ Failed
//! ```
//!
//! Progress is reported line by line through the injected [`LogSink`]; the
//! final outcome is a [`BuildReport`]. `run_build` never returns an error and
//! never panics on an external failure: every fault becomes a logged line and
//! the `Failed` status.
//!
//! The orchestrator is `Send + Sync`. A front-end that wants to stay
//! responsive runs `run_build` on a worker and calls [`Orchestrator::cancel`]
//! from elsewhere.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, info_span, warn};

use super::command::{build_args, expected_output_path, format_command};
use super::process::{spawn_combined, terminate};
use super::toolchain::Toolchain;
use super::types::{BuildError, BuildReport, BuildStatus, LogSink, describe_code};
use crate::config::BuildConfig;
use crate::consts::{SPEC_EXTENSION, WORK_DIR};
use crate::util::format_size;

/// How long a cancelled child gets to exit before it is killed.
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_secs(5);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives PyInstaller for one [`BuildConfig`].
pub struct Orchestrator {
  config: BuildConfig,
  toolchain: Toolchain,
  sink: LogSink,
  status: Mutex<BuildStatus>,
  child: Mutex<Option<Child>>,
  started: AtomicBool,
  cancelled: AtomicBool,
  cancel_grace: Duration,
}

impl Orchestrator {
  /// Create an orchestrator in the `Idle` state using [`Toolchain::from_env`].
  pub fn new<F>(config: BuildConfig, sink: F) -> Self
  where
    F: Fn(&str) + Send + Sync + 'static,
  {
    Self::with_sink(config, Arc::new(sink))
  }

  pub fn with_sink(config: BuildConfig, sink: LogSink) -> Self {
    Self {
      config,
      toolchain: Toolchain::from_env(),
      sink,
      status: Mutex::new(BuildStatus::Idle),
      child: Mutex::new(None),
      started: AtomicBool::new(false),
      cancelled: AtomicBool::new(false),
      cancel_grace: DEFAULT_CANCEL_GRACE,
    }
  }

  pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
    self.toolchain = toolchain;
    self
  }

  pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
    self.cancel_grace = grace;
    self
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  pub fn toolchain(&self) -> &Toolchain {
    &self.toolchain
  }

  pub fn status(&self) -> BuildStatus {
    *lock(&self.status)
  }

  /// Whether a child process is currently alive.
  pub fn is_running(&self) -> bool {
    lock(&self.child)
      .as_mut()
      .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
  }

  /// Full PyInstaller invocation, interpreter first and script path last.
  pub fn compute_command(&self) -> Vec<String> {
    let mut argv = self.toolchain.build_prefix();
    argv.extend(build_args(&self.config));
    argv
  }

  pub fn expected_output_path(&self) -> PathBuf {
    expected_output_path(&self.config)
  }

  /// Run the whole build. With `stream_output`, PyInstaller's output reaches
  /// the sink as it is produced; otherwise it is emitted once the process exits.
  ///
  /// An orchestrator runs once. Later calls leave the status untouched and
  /// report [`BuildError::AlreadyStarted`].
  pub fn run_build(&self, stream_output: bool) -> BuildReport {
    let span = info_span!("build", exe = %self.config.exe_name());
    let _enter = span.enter();

    if self.started.swap(true, Ordering::SeqCst) {
      let status = self.status();
      warn!(%status, "build already started");
      return BuildReport {
        status,
        artifact: None,
        error: Some(BuildError::AlreadyStarted(status)),
      };
    }

    match self.execute(stream_output) {
      Ok(artifact) => BuildReport {
        status: self.status(),
        artifact: Some(artifact),
        error: None,
      },
      Err(err) => {
        self.fail(&err);
        BuildReport {
          status: self.status(),
          artifact: None,
          error: Some(err),
        }
      }
    }
  }

  /// Stop the build. A running child is asked to terminate, then killed
  /// after the grace period. Leaves the orchestrator `Failed` unless it
  /// already finished; calling it again is a no-op.
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
    {
      let mut status = lock(&self.status);
      if status.is_terminal() {
        return;
      }
      debug!(from = %*status, "cancelling build");
      *status = BuildStatus::Failed;
    }

    let mut guard = lock(&self.child);
    if let Some(child) = guard.as_mut() {
      if matches!(child.try_wait(), Ok(None)) {
        self.log("Stopping build process...");
        match terminate(child, self.cancel_grace) {
          Ok(()) => self.log("Build process stopped"),
          Err(err) => {
            warn!(error = %err, "failed to stop build process");
            self.log(&format!("Warning: Could not stop build process: {err}"));
          }
        }
      }
    }
    self.log("Build cancelled");
  }

  fn log(&self, line: &str) {
    (self.sink)(line);
  }

  fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }

  /// Move to `next` unless the build was cancelled or already finished.
  fn advance(&self, next: BuildStatus) -> Result<(), BuildError> {
    let mut status = lock(&self.status);
    if status.is_terminal() || self.is_cancelled() {
      return Err(BuildError::Cancelled);
    }
    debug!(from = %*status, to = %next, "status transition");
    *status = next;
    Ok(())
  }

  fn fail(&self, err: &BuildError) {
    {
      let mut status = lock(&self.status);
      if *status != BuildStatus::Complete {
        *status = BuildStatus::Failed;
      }
    }
    match err {
      // cancel() already reported it
      BuildError::Cancelled => {}
      BuildError::MissingArtifact { path } => {
        warn!(path = %path.display(), "expected artifact missing");
        self.log(&format!("Warning: Expected output not found: {}", path.display()));
      }
      _ => {
        warn!(error = %err, "build failed");
        self.log(&format!("Build error: {err}"));
      }
    }
  }

  fn execute(&self, stream_output: bool) -> Result<PathBuf, BuildError> {
    self.config.validate()?;

    self.advance(BuildStatus::CheckingDependencies)?;
    self.log("Checking PyInstaller installation...");
    if self.toolchain_installed() {
      self.log("PyInstaller is installed");
    } else {
      self.log("PyInstaller not found");
      self.advance(BuildStatus::InstallingDependencies)?;
      self.install_toolchain()?;
    }

    self.advance(BuildStatus::Building)?;
    let args = build_args(&self.config);
    let mut argv = self.toolchain.build_prefix();
    argv.extend(args.iter().cloned());
    self.log(&format!("Building executable: {}", self.config.exe_name()));
    self.log(&format!("Command: {}", format_command(&argv)));

    let mut command = self.toolchain.build_command(&args);
    command.current_dir(self.config.script_dir());
    let (status, captured) = self.supervise(command, stream_output)?;
    for line in &captured {
      self.log(line);
    }
    if !status.success() {
      self.log(&format!("Build failed with return code {}", describe_code(&status.code())));
      return Err(BuildError::ExecutionFailed { code: status.code() });
    }

    if self.config.clean_build() {
      self.advance(BuildStatus::Cleaning)?;
      self.clean_artifacts(self.config.script_dir());
    }

    let artifact = self.verify_artifact()?;
    self.advance(BuildStatus::Complete)?;
    info!(path = %artifact.display(), "build complete");
    Ok(artifact)
  }

  /// Check failures, including a missing interpreter, count as "not installed".
  fn toolchain_installed(&self) -> bool {
    match self.toolchain.check_command().output() {
      Ok(output) => {
        debug!(code = ?output.status.code(), "pyinstaller check finished");
        output.status.success()
      }
      Err(err) => {
        warn!(error = %err, python = %self.toolchain.python().display(), "pyinstaller check failed");
        self.log(&format!("Error checking PyInstaller: {err}"));
        false
      }
    }
  }

  fn install_toolchain(&self) -> Result<(), BuildError> {
    self.log("Installing PyInstaller...");
    let proxy = self.config.proxy();
    if let Some(url) = proxy {
      self.log(&format!("Using proxy: {url}"));
    }

    let (status, captured) = self.supervise(self.toolchain.install_command(proxy), false)?;
    if !status.success() {
      for line in &captured {
        self.log(line);
      }
      return Err(BuildError::DependencyInstall { code: status.code() });
    }

    self.log("PyInstaller installed successfully");
    Ok(())
  }

  /// Spawn `command`, read its combined output to the end and reap it.
  ///
  /// The child is parked in `self.child` while it runs so `cancel` can reach
  /// it. Streamed lines go straight to the sink; otherwise they are returned.
  fn supervise(&self, command: Command, stream_output: bool) -> Result<(ExitStatus, Vec<String>), BuildError> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!(program = %program, cwd = ?command.get_current_dir(), "spawning process");
    let (child, lines) = spawn_combined(command).map_err(|source| BuildError::Spawn { program, source })?;
    *lock(&self.child) = Some(child);

    // cancel() may have run between the last status check and the spawn above
    if self.is_cancelled() {
      self.stop_child();
    }

    let mut captured = Vec::new();
    let mut read_error = None;
    for line in lines {
      match line {
        Ok(line) if stream_output => self.log(&line),
        Ok(line) => captured.push(line),
        Err(err) => {
          read_error = Some(err);
          break;
        }
      }
    }

    if let Some(err) = read_error {
      self.stop_child();
      lock(&self.child).take();
      return Err(BuildError::Io(err));
    }

    let status = match lock(&self.child).take() {
      Some(mut child) => child.wait()?,
      None => return Err(BuildError::Cancelled),
    };
    debug!(code = ?status.code(), "process exited");

    if self.is_cancelled() {
      return Err(BuildError::Cancelled);
    }
    Ok((status, captured))
  }

  fn stop_child(&self) {
    if let Some(child) = lock(&self.child).as_mut() {
      if let Err(err) = terminate(child, self.cancel_grace) {
        warn!(error = %err, "failed to stop child process");
      }
    }
  }

  /// Remove PyInstaller's work directory and spec file. Failures are warnings.
  fn clean_artifacts(&self, script_dir: &Path) {
    self.log("Cleaning build artifacts...");

    let work_dir = script_dir.join(WORK_DIR);
    if work_dir.exists() {
      match fs::remove_dir_all(&work_dir) {
        Ok(()) => self.log(&format!("Removed: {}", work_dir.display())),
        Err(err) => {
          warn!(path = %work_dir.display(), error = %err, "cleanup failed");
          self.log(&format!("Warning: Could not remove build dir: {err}"));
        }
      }
    }

    let spec_file = script_dir.join(format!("{}.{}", self.config.exe_name(), SPEC_EXTENSION));
    if spec_file.exists() {
      match fs::remove_file(&spec_file) {
        Ok(()) => self.log(&format!("Removed: {}", spec_file.display())),
        Err(err) => {
          warn!(path = %spec_file.display(), error = %err, "cleanup failed");
          self.log(&format!("Warning: Could not remove spec file: {err}"));
        }
      }
    }
  }

  fn verify_artifact(&self) -> Result<PathBuf, BuildError> {
    let path = self.expected_output_path();
    match fs::metadata(&path) {
      Ok(metadata) => {
        self.log(&format!("Executable created: {}", path.display()));
        self.log(&format!("Size: {}", format_size(metadata.len())));
        Ok(path)
      }
      Err(_) => Err(BuildError::MissingArtifact { path }),
    }
  }
}
