//! Human readable formatting for byte counts reported in warnings and logs.

const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// Format a byte count with decimal units and three significant digits (`1.23 MB`).
pub fn pretty_bytes(bytes: u64) -> String {
  if bytes < 1000 {
    return format!("{bytes} B");
  }

  let mut value = bytes as f64;
  let mut exponent = 0;
  while value >= 1000.0 && exponent < UNITS.len() - 1 {
    value /= 1000.0;
    exponent += 1;
  }

  let decimals = if value >= 100.0 {
    0
  } else if value >= 10.0 {
    1
  } else {
    2
  };
  let mut text = format!("{value:.decimals$}");
  if text.contains('.') {
    text = text.trim_end_matches('0').trim_end_matches('.').to_string();
  }

  format!("{text} {}", UNITS[exponent])
}
