//! Data structures flowing through manifest generation and injection.

use serde::{Deserialize, Deserializer, Serialize};

use crate::manifest::normalize::resolve_public_url;

/// Build output considered for precaching, as reported by the build graph.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetail {
  /// Logical URL (or path) of the output file.
  pub path: String,
  /// Content hash, or `None` when the file is immutable or already content-hashed.
  pub content_hash: Option<String>,
  /// Size of the output in bytes.
  pub size_bytes: u64,
}

impl FileDetail {
  /// Describe a named build asset served below `public_path`.
  pub fn from_asset(
    public_path: Option<&str>,
    name: &str,
    content_hash: Option<String>,
    size_bytes: u64,
  ) -> Self {
    Self {
      path: resolve_public_url(public_path, name),
      content_hash,
      size_bytes,
    }
  }
}

/// Public shape of one precached resource.
///
/// Field order matches the serialized key order (`integrity`, `revision`, `url`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestEntry {
  /// Subresource integrity metadata.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub integrity: Option<String>,
  /// Cache-busting token; `None` means the URL is stable as-is.
  pub revision: Option<String>,
  /// URL the service worker should precache.
  pub url: String,
}

/// Manifest entry still carrying its byte size while transforms run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedManifestEntry {
  /// URL the service worker should precache.
  pub url: String,
  /// Cache-busting token; `None` means the URL is stable as-is.
  pub revision: Option<String>,
  /// Subresource integrity metadata.
  pub integrity: Option<String>,
  /// Size in bytes, dropped once the pipeline finishes.
  pub size: u64,
}

impl SizedManifestEntry {
  /// Drop the transient size, producing the public entry shape.
  pub fn into_entry(self) -> ManifestEntry {
    ManifestEntry {
      integrity: self.integrity,
      revision: self.revision,
      url: self.url,
    }
  }
}

/// Literal entry appended to the manifest after every other transform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalEntry {
  /// Bare URL without any revisioning information.
  Url(String),
  /// Full entry object.
  Entry(AdditionalEntryRecord),
}

/// Object form of an [`AdditionalEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdditionalEntryRecord {
  /// URL to precache.
  pub url: String,
  /// `None` when the field was omitted, `Some(None)` for an explicit `null`.
  #[serde(default, deserialize_with = "deserialize_present")]
  pub revision: Option<Option<String>>,
  /// Subresource integrity metadata.
  #[serde(default)]
  pub integrity: Option<String>,
}

impl AdditionalEntry {
  /// URL named by this entry.
  pub fn url(&self) -> &str {
    match self {
      AdditionalEntry::Url(url) => url,
      AdditionalEntry::Entry(record) => &record.url,
    }
  }

  /// Whether the entry omits revision information entirely.
  pub fn lacks_revision(&self) -> bool {
    match self {
      AdditionalEntry::Url(_) => true,
      AdditionalEntry::Entry(record) => record.revision.is_none(),
    }
  }
}

impl From<&str> for AdditionalEntry {
  fn from(url: &str) -> Self {
    AdditionalEntry::Url(url.to_string())
  }
}

impl From<ManifestEntry> for AdditionalEntry {
  fn from(entry: ManifestEntry) -> Self {
    AdditionalEntry::Entry(AdditionalEntryRecord {
      url: entry.url,
      revision: Some(entry.revision),
      integrity: entry.integrity,
    })
  }
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer).map(Some)
}

/// Output of a single manifest transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformResult {
  /// Manifest handed to the next transform.
  pub manifest: Vec<SizedManifestEntry>,
  /// Data-quality warnings produced by the transform.
  pub warnings: Vec<String>,
}

impl TransformResult {
  /// Result carrying no warnings.
  pub fn new(manifest: Vec<SizedManifestEntry>) -> Self {
    Self {
      manifest,
      warnings: Vec::new(),
    }
  }
}

/// Finalized pipeline output with sizes stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformedManifest {
  /// Number of entries left after every transform.
  pub count: usize,
  /// Sum of the sizes of those entries.
  pub size: u64,
  /// Final entries, in pipeline order.
  pub entries: Vec<ManifestEntry>,
  /// Warnings from every stage, in execution order.
  pub warnings: Vec<String>,
}

/// Position of one marker occurrence replaced in the target text.
///
/// Columns are UTF-16 code units measured in the line as it was before substitution, the
/// same units source map columns use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplacementSpan {
  /// 1-based line number.
  pub line: u32,
  /// 0-based column of the first character of the marker.
  pub column: u32,
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn additional_entries_distinguish_missing_and_null_revisions() {
    let entries: Vec<AdditionalEntry> = serde_json::from_str(
      r#"["/offline.html", {"url": "/a.js"}, {"url": "/b.js", "revision": null}, {"url": "/c.js", "revision": "1"}]"#,
    )
    .unwrap();

    let lacking: Vec<bool> = entries.iter().map(AdditionalEntry::lacks_revision).collect();
    assert_eq!(lacking, vec![true, true, false, false]);
    assert_eq!(entries[2].url(), "/b.js");
  }

  #[test]
  fn manifest_entries_serialize_with_stable_key_order() {
    let entry = ManifestEntry {
      integrity: Some("sha384-x".into()),
      revision: None,
      url: "/index.html".into(),
    };

    assert_eq!(
      serde_json::to_string(&entry).unwrap(),
      r#"{"integrity":"sha384-x","revision":null,"url":"/index.html"}"#
    );
  }

  #[test]
  fn from_asset_prefixes_public_path() {
    let detail = FileDetail::from_asset(Some("/static/"), "app.js", Some("abc".into()), 10);
    assert_eq!(detail.path, "/static/app.js");
  }
}
