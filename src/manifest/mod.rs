//! Precache manifest generation broken into focused submodules for easier testing.

pub mod normalize;
mod pipeline;
mod serialize;
pub mod transforms;

pub use pipeline::{ManifestOptions, transform_manifest};
pub use serialize::{sort_entries, stringify_manifest};

use tracing::warn;

use crate::error::InjectError;
use crate::models::{FileDetail, ManifestEntry};

/// Manifest ready for injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedManifest {
  /// Entries sorted ascending by URL.
  pub entries: Vec<ManifestEntry>,
  /// Serialized form of `entries`.
  pub json: String,
  /// Total size in bytes of the precached build outputs.
  pub size: u64,
  /// Data-quality warnings collected by the pipeline.
  pub warnings: Vec<String>,
}

/// Run the pipeline over `details`, then sort and serialize the result.
pub fn generate_manifest(
  details: &[FileDetail],
  options: &ManifestOptions,
) -> Result<GeneratedManifest, InjectError> {
  let transformed = transform_manifest(details, options)?;
  for warning in &transformed.warnings {
    warn!("{warning}");
  }

  let mut entries = transformed.entries;
  sort_entries(&mut entries);
  let json = stringify_manifest(&entries)?;

  Ok(GeneratedManifest {
    entries,
    json,
    size: transformed.size,
    warnings: transformed.warnings,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn arb_details() -> impl Strategy<Value = Vec<FileDetail>> {
    prop::collection::vec(
      (
        "[a-z]{1,6}(/[a-z]{1,6})?\\.(js|css|html)",
        prop::option::of("[0-9a-f]{8}"),
        0u64..10_000,
      )
        .prop_map(|(path, content_hash, size_bytes)| FileDetail {
          path,
          content_hash,
          size_bytes,
        }),
      0..12,
    )
  }

  fn options() -> ManifestOptions {
    ManifestOptions::new()
      .maximum_file_size_to_cache_in_bytes(5_000)
      .dont_cache_bust_urls_matching(regex::Regex::new(r"\.html$").unwrap())
      .additional_manifest_entries(vec!["/offline.html".into()])
  }

  proptest! {
    /// Identical input and configuration always produce byte-identical output.
    #[test]
    fn generation_is_deterministic(details in arb_details()) {
      let first = generate_manifest(&details, &options()).unwrap();
      let second = generate_manifest(&details, &options()).unwrap();
      prop_assert_eq!(&first.json, &second.json);
      prop_assert_eq!(first.size, second.size);
    }

    /// Output is sorted by URL regardless of input order.
    #[test]
    fn entries_are_sorted(details in arb_details()) {
      let generated = generate_manifest(&details, &options()).unwrap();
      let urls: Vec<&str> = generated.entries.iter().map(|entry| entry.url.as_str()).collect();
      let mut sorted = urls.clone();
      sorted.sort();
      prop_assert_eq!(urls, sorted);
    }
  }
}
