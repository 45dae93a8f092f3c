//! Conversion of build-graph outputs into manifest entries.

use crate::models::{FileDetail, SizedManifestEntry};

/// Join an emitted asset name onto the public path it is served from.
///
/// A missing public path, or the bundler's `"auto"` placeholder, leaves the name untouched
/// so the service worker resolves it relative to its own location.
pub fn resolve_public_url(public_path: Option<&str>, name: &str) -> String {
  match public_path {
    None | Some("auto") => name.to_string(),
    Some(prefix) => format!("{prefix}{name}"),
  }
}

/// Convert build outputs into manifest entries, one per input and in input order.
///
/// Paths always end up with forward slashes regardless of the separator the build graph
/// reported them with.
pub fn normalize_file_details(details: &[FileDetail]) -> Vec<SizedManifestEntry> {
  details
    .iter()
    .map(|detail| SizedManifestEntry {
      url: detail.path.replace('\\', "/"),
      revision: detail.content_hash.clone(),
      integrity: None,
      size: detail.size_bytes,
    })
    .collect()
}
