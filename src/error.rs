//! Fatal errors raised while generating or injecting a precache manifest.

/// Errors that abort manifest generation or injection for a build.
///
/// Data-quality problems (oversized files, unrevisioned extra entries) are reported as
/// warnings instead and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
  /// `modifyURLPrefix` was not an object of string to string pairs.
  #[error("The 'modifyURLPrefix' parameter must be an object with string key value pairs.")]
  InvalidUrlPrefixMap,

  /// A transform left an entry without a usable URL.
  #[error(
    "The generated manifest contains an entry without a URL string. This is likely an error in {stage}."
  )]
  MissingUrl {
    /// Stage that detected the malformed entry.
    stage: &'static str,
  },

  /// The injection point does not occur in the target text.
  #[error("Can't find {marker} in your service worker source.")]
  MarkerNotFound {
    /// Marker that was searched for.
    marker: String,
  },

  /// Source map repair only supports single-line marker and replacement text.
  #[error("cannot update the source map: {what} spans multiple lines")]
  MultiLineReplacement {
    /// Which side of the substitution contained a newline.
    what: &'static str,
  },

  /// `dontCacheBustURLsMatching` is not a valid regular expression.
  #[error("invalid dontCacheBustURLsMatching pattern: {source}")]
  InvalidPattern {
    /// Underlying regex error.
    #[from]
    source: regex::Error,
  },

  /// The supplied source map could not be decoded.
  #[error("invalid source map: {reason}")]
  SourceMap {
    /// Description of the decoding failure.
    reason: String,
  },

  /// The manifest or source map could not be serialized.
  #[error("serialization error: {source}")]
  Serialization {
    /// Underlying serializer error.
    #[from]
    source: serde_json::Error,
  },

  /// A caller-supplied transform failed.
  #[error("manifest transform '{name}' failed: {reason}")]
  Transform {
    /// Name of the failing transform.
    name: String,
    /// Failure reported by the transform.
    reason: String,
  },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn marker_not_found_names_the_marker() {
    let err = InjectError::MarkerNotFound {
      marker: "self.__WB_MANIFEST".into(),
    };
    assert!(err.to_string().contains("self.__WB_MANIFEST"));
  }

  #[test]
  fn missing_url_names_the_stage() {
    let err = InjectError::MissingUrl {
      stage: "modifyURLPrefix",
    };
    let msg = err.to_string();
    assert!(msg.contains("without a URL string"));
    assert!(msg.contains("modifyURLPrefix"));
  }

  #[test]
  fn invalid_pattern_wraps_regex_error() {
    let err: InjectError = regex::Regex::new("(").unwrap_err().into();
    assert!(err.to_string().starts_with("invalid dontCacheBustURLsMatching pattern"));
  }
}
