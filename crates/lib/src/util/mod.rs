//! Shared utilities.

#[cfg(test)]
pub mod testutil;

/// Human-readable size in binary units, e.g. `512 B` or `12.34 MB`.
pub fn format_size(bytes: u64) -> String {
  const UNITS: [&str; 3] = ["KB", "MB", "GB"];

  if bytes < 1024 {
    return format!("{bytes} B");
  }
  let mut value = bytes as f64 / 1024.0;
  let mut unit = 0;
  while value >= 1024.0 && unit < UNITS.len() - 1 {
    value /= 1024.0;
    unit += 1;
  }
  format!("{value:.2} {}", UNITS[unit])
}
