//! Terminal output for p2e.
//!
//! Three kinds of output: status lines with a colored symbol, the aligned
//! configuration table, and build log lines tinted by what they report.

use std::fmt::Display;
use std::time::Duration;

use anyhow::Context;
use owo_colors::{OwoColorize, Stream, Style};

/// Width of the label column in the configuration table.
const LABEL_WIDTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Info,
  Warning,
  Error,
}

impl Level {
  fn symbol(self) -> &'static str {
    match self {
      Level::Success => "✓",
      Level::Info => "•",
      Level::Warning => "⚠",
      Level::Error => "✗",
    }
  }

  fn style(self) -> Style {
    match self {
      Level::Success => Style::new().green(),
      Level::Info => Style::new().blue(),
      Level::Warning => Style::new().yellow(),
      Level::Error => Style::new().red(),
    }
  }
}

/// Print `message` behind the level's symbol. Warnings and errors go to stderr.
pub fn status(level: Level, message: &str) {
  let style = level.style();
  match level {
    Level::Success | Level::Info => println!(
      "{} {}",
      level.symbol().if_supports_color(Stream::Stdout, |s| s.style(style)),
      message
    ),
    Level::Warning | Level::Error => eprintln!(
      "{} {}",
      level.symbol().if_supports_color(Stream::Stderr, |s| s.style(style)),
      message.if_supports_color(Stream::Stderr, |s| s.style(style))
    ),
  }
}

/// One row of the configuration table.
pub fn field(label: &str, value: impl Display) {
  let label = format!("{:<width$}", format!("{label}:"), width = LABEL_WIDTH);
  println!("  {} {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// How a build log line should be highlighted, if at all.
pub fn log_level(line: &str) -> Option<Level> {
  if line.starts_with("Warning:") {
    Some(Level::Warning)
  } else if line.starts_with("Build error") || line.starts_with("Build failed") {
    Some(Level::Error)
  } else if line.starts_with("Executable created") || line == "PyInstaller installed successfully" {
    Some(Level::Success)
  } else {
    None
  }
}

/// Sink for the orchestrator's log. Every line goes to stdout in order.
pub fn log_line(line: &str) {
  match log_level(line) {
    Some(level) => println!("{}", line.if_supports_color(Stream::Stdout, |s| s.style(level.style()))),
    None => println!("{}", line),
  }
}

pub fn on_off(value: bool) -> &'static str {
  if value { "on" } else { "off" }
}

/// Build time, coarse enough to read at a glance.
pub fn format_elapsed(elapsed: Duration) -> String {
  let secs = elapsed.as_secs();
  if secs >= 60 {
    format!("{}m {:02}s", secs / 60, secs % 60)
  } else if secs >= 1 {
    format!("{:.1}s", elapsed.as_secs_f64())
  } else {
    format!("{}ms", elapsed.as_millis())
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn elapsed_units() {
    assert_eq!(format_elapsed(Duration::from_millis(450)), "450ms");
    assert_eq!(format_elapsed(Duration::from_millis(2500)), "2.5s");
    assert_eq!(format_elapsed(Duration::from_secs(65)), "1m 05s");
  }

  #[test]
  fn log_lines_are_classified() {
    assert_eq!(log_level("Warning: Could not remove build dir"), Some(Level::Warning));
    assert_eq!(log_level("Build failed with return code 1"), Some(Level::Error));
    assert_eq!(log_level("Build error: build cancelled"), Some(Level::Error));
    assert_eq!(log_level("Executable created: /proj/dist/app"), Some(Level::Success));
    assert_eq!(log_level("INFO: PyInstaller: 6.3.0"), None);
  }

  #[test]
  fn switches_read_on_off() {
    assert_eq!(on_off(true), "on");
    assert_eq!(on_off(false), "off");
  }
}
