use regex::Regex;

use crate::error::InjectError;
use crate::manifest::transforms::{ManifestTransform, ensure_urls};
use crate::models::{SizedManifestEntry, TransformResult};

/// Clears the revision of entries whose URL matches a pattern.
///
/// Matching entries stay in the manifest; they are just never cache-busted by revision.
#[derive(Debug, Clone)]
pub struct NoRevisionForUrlsMatchingTransform {
  pattern: Regex,
}

impl NoRevisionForUrlsMatchingTransform {
  /// Suppress revisions for URLs matching `pattern`.
  pub fn new(pattern: Regex) -> Self {
    Self { pattern }
  }
}

impl ManifestTransform for NoRevisionForUrlsMatchingTransform {
  fn name(&self) -> &str {
    "dontCacheBustURLsMatching"
  }

  fn apply(&self, mut manifest: Vec<SizedManifestEntry>) -> Result<TransformResult, InjectError> {
    ensure_urls(&manifest, "dontCacheBustURLsMatching")?;
    for entry in &mut manifest {
      if self.pattern.is_match(&entry.url) {
        entry.revision = None;
      }
    }

    Ok(TransformResult::new(manifest))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::transforms::tests::entry;
  use pretty_assertions::assert_eq;

  #[test]
  fn nulls_revisions_of_matching_urls_only() {
    let transform = NoRevisionForUrlsMatchingTransform::new(Regex::new(r"\.html$").unwrap());
    let result = transform
      .apply(vec![
        entry("index.html", Some("aaa"), 1),
        entry("app.js", Some("bbb"), 1),
        entry("about.html.js", Some("ccc"), 1),
      ])
      .unwrap();

    assert_eq!(result.manifest, vec![
      entry("index.html", None, 1),
      entry("app.js", Some("bbb"), 1),
      entry("about.html.js", Some("ccc"), 1),
    ]);
  }

  #[test]
  fn rejects_entries_without_urls() {
    let transform = NoRevisionForUrlsMatchingTransform::new(Regex::new("x").unwrap());
    let err = transform.apply(vec![entry("", Some("1"), 0)]).unwrap_err();
    assert!(matches!(err, InjectError::MissingUrl { .. }));
  }
}
