//! Ordering and JSON serialization of the final manifest.

use crate::error::InjectError;
use crate::models::ManifestEntry;

/// Sort entries ascending by URL; entries sharing a URL keep their pipeline order.
///
/// URLs compare by UTF-16 code units, matching the order a service worker runtime produces.
pub fn sort_entries(entries: &mut [ManifestEntry]) {
  entries.sort_by(|a, b| a.url.encode_utf16().cmp(b.url.encode_utf16()));
}

/// Serialize entries as compact JSON with keys in `integrity`, `revision`, `url` order.
pub fn stringify_manifest(entries: &[ManifestEntry]) -> Result<String, InjectError> {
  Ok(serde_json::to_string(entries)?)
}
