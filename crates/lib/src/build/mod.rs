//! Build orchestration.
//!
//! A build turns one [`BuildConfig`](crate::config::BuildConfig) into a
//! PyInstaller invocation, supervises it and checks what it produced.
//!
//! # Submodules
//!
//! - [`command`] - PyInstaller argument construction and output-path prediction
//! - [`orchestrator`] - The build state machine
//! - [`process`] - Combined-output child processes and termination
//! - [`toolchain`] - The Python interpreter, pip and PyInstaller

pub mod command;
pub mod orchestrator;
pub mod process;
pub mod toolchain;
mod types;

pub use command::{build_args, expected_output_path, format_command};
pub use orchestrator::{DEFAULT_CANCEL_GRACE, Orchestrator};
pub use toolchain::Toolchain;
pub use types::*;
