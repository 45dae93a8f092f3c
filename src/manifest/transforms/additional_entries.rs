use std::collections::BTreeSet;

use crate::error::InjectError;
use crate::manifest::transforms::ManifestTransform;
use crate::models::{AdditionalEntry, SizedManifestEntry, TransformResult};

/// Appends literal entries to the manifest, bypassing every built-in policy.
#[derive(Debug, Clone, Default)]
pub struct AdditionalEntriesTransform {
  entries: Vec<AdditionalEntry>,
}

impl AdditionalEntriesTransform {
  /// Append `entries` in the given order.
  pub fn new(entries: Vec<AdditionalEntry>) -> Self {
    Self { entries }
  }
}

impl ManifestTransform for AdditionalEntriesTransform {
  fn name(&self) -> &str {
    "additionalManifestEntries"
  }

  fn apply(&self, mut manifest: Vec<SizedManifestEntry>) -> Result<TransformResult, InjectError> {
    let mut seen = BTreeSet::new();
    let mut unrevisioned = Vec::new();

    for additional in &self.entries {
      // An explicit `revision: null` is fine; only a missing revision is unsafe.
      if additional.lacks_revision() && seen.insert(additional.url().to_string()) {
        unrevisioned.push(additional.url().to_string());
      }

      manifest.push(match additional {
        AdditionalEntry::Url(url) => SizedManifestEntry {
          url: url.clone(),
          revision: None,
          integrity: None,
          size: 0,
        },
        AdditionalEntry::Entry(record) => SizedManifestEntry {
          url: record.url.clone(),
          revision: record.revision.clone().flatten(),
          integrity: record.integrity.clone(),
          size: 0,
        },
      });
    }

    let mut warnings = Vec::new();
    if !unrevisioned.is_empty() {
      let urls: String = unrevisioned
        .iter()
        .map(|url| format!("  - {url}\n"))
        .collect();
      warnings.push(format!(
        "Some items were passed to additionalManifestEntries without revisioning info. This is generally NOT safe.\n{urls}"
      ));
    }

    Ok(TransformResult { manifest, warnings })
  }
}
