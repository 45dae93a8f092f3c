//! Locating the injection point and substituting the serialized manifest.

use regex::{NoExpand, Regex};

use crate::error::InjectError;
use crate::models::ReplacementSpan;

/// Text after substitution together with the bookkeeping needed to repair a source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
  /// Text with every marker occurrence replaced.
  pub text: String,
  /// One span per replaced occurrence, in text order.
  pub spans: Vec<ReplacementSpan>,
  /// Replacement width minus marker width, in UTF-16 units.
  pub column_shift: i64,
}

fn marker_pattern(marker: &str) -> Result<Regex, InjectError> {
  if marker.is_empty() {
    return Err(InjectError::MarkerNotFound {
      marker: String::new(),
    });
  }
  Ok(Regex::new(&regex::escape(marker))?)
}

/// Count literal occurrences of `marker`, failing when there are none.
pub fn ensure_marker(text: &str, marker: &str) -> Result<usize, InjectError> {
  let occurrences = marker_pattern(marker)?.find_iter(text).count();
  if occurrences == 0 {
    return Err(InjectError::MarkerNotFound {
      marker: marker.to_string(),
    });
  }
  Ok(occurrences)
}

/// Replace every occurrence of `marker` without tracking positions.
pub fn substitute_marker(text: &str, marker: &str, replacement: &str) -> Result<String, InjectError> {
  ensure_marker(text, marker)?;
  Ok(
    marker_pattern(marker)?
      .replace_all(text, NoExpand(replacement))
      .into_owned(),
  )
}

/// Replace every occurrence of `marker` line by line, recording where each one was.
///
/// Both strings must fit on a single line, since the recorded spans only describe
/// same-line column shifts.
pub fn substitute_marker_tracked(
  text: &str,
  marker: &str,
  replacement: &str,
) -> Result<Substitution, InjectError> {
  if marker.contains('\n') {
    return Err(InjectError::MultiLineReplacement { what: "marker" });
  }
  if replacement.contains('\n') {
    return Err(InjectError::MultiLineReplacement {
      what: "replacement",
    });
  }

  let pattern = marker_pattern(marker)?;
  let mut spans = Vec::new();
  let mut lines = Vec::new();

  for (index, line) in text.split('\n').enumerate() {
    for found in pattern.find_iter(line) {
      spans.push(ReplacementSpan {
        line: u32::try_from(index + 1).unwrap_or(u32::MAX),
        column: utf16_width(&line[..found.start()]),
      });
    }
    lines.push(pattern.replace_all(line, NoExpand(replacement)));
  }

  if spans.is_empty() {
    return Err(InjectError::MarkerNotFound {
      marker: marker.to_string(),
    });
  }

  Ok(Substitution {
    text: lines.join("\n"),
    spans,
    column_shift: i64::from(utf16_width(replacement)) - i64::from(utf16_width(marker)),
  })
}

fn utf16_width(text: &str) -> u32 {
  u32::try_from(text.encode_utf16().count()).unwrap_or(u32::MAX)
}
