//! Fixed-order transform pipeline turning build outputs into the final manifest.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::debug;

use crate::error::InjectError;
use crate::manifest::normalize::normalize_file_details;
use crate::manifest::transforms::{
  AdditionalEntriesTransform, ManifestTransform, MaximumSizeTransform, ModifyUrlPrefixTransform,
  NoRevisionForUrlsMatchingTransform,
};
use crate::models::{AdditionalEntry, FileDetail, SizedManifestEntry, TransformedManifest};

/// Transforms applied to the normalized manifest.
///
/// Stages run in a fixed order no matter which setter was called first: size filter, URL
/// prefix rewrite, revision suppression, caller transforms, then literal entries. Options
/// that were never set contribute no stage at all.
#[derive(Default)]
pub struct ManifestOptions {
  maximum_size: Option<MaximumSizeTransform>,
  modify_url_prefix: Option<ModifyUrlPrefixTransform>,
  no_revision: Option<NoRevisionForUrlsMatchingTransform>,
  custom: Vec<Box<dyn ManifestTransform>>,
  additional_entries: Option<AdditionalEntriesTransform>,
}

impl ManifestOptions {
  /// Options with every stage disabled.
  pub fn new() -> Self {
    Self::default()
  }

  /// Drop entries larger than `bytes`; a limit of 0 means no limit.
  pub fn maximum_file_size_to_cache_in_bytes(mut self, bytes: u64) -> Self {
    self.maximum_size = (bytes > 0).then(|| MaximumSizeTransform::new(bytes));
    self
  }

  /// Rewrite URL prefixes using `prefixes`.
  pub fn modify_url_prefix(mut self, prefixes: BTreeMap<String, String>) -> Self {
    self.modify_url_prefix = Some(ModifyUrlPrefixTransform::new(prefixes));
    self
  }

  /// Use an already validated prefix rewrite stage.
  pub fn modify_url_prefix_transform(mut self, transform: ModifyUrlPrefixTransform) -> Self {
    self.modify_url_prefix = Some(transform);
    self
  }

  /// Clear revisions of URLs matching `pattern`.
  pub fn dont_cache_bust_urls_matching(mut self, pattern: Regex) -> Self {
    self.no_revision = Some(NoRevisionForUrlsMatchingTransform::new(pattern));
    self
  }

  /// Append a caller transform; caller transforms run in the order they were added.
  pub fn manifest_transform(mut self, transform: impl ManifestTransform + 'static) -> Self {
    self.custom.push(Box::new(transform));
    self
  }

  /// Append literal entries after every other stage.
  pub fn additional_manifest_entries(mut self, entries: Vec<AdditionalEntry>) -> Self {
    self.additional_entries = Some(AdditionalEntriesTransform::new(entries));
    self
  }

  fn stages(&self) -> Vec<&dyn ManifestTransform> {
    let mut stages: Vec<&dyn ManifestTransform> = Vec::new();
    if let Some(stage) = &self.maximum_size {
      stages.push(stage);
    }
    if let Some(stage) = &self.modify_url_prefix {
      stages.push(stage);
    }
    if let Some(stage) = &self.no_revision {
      stages.push(stage);
    }
    stages.extend(self.custom.iter().map(|stage| stage.as_ref()));
    if let Some(stage) = &self.additional_entries {
      stages.push(stage);
    }
    stages
  }
}

/// Normalize `details`, run every configured stage in order and finalize the result.
///
/// The first failing stage aborts the run; no partial manifest is returned.
pub fn transform_manifest(
  details: &[FileDetail],
  options: &ManifestOptions,
) -> Result<TransformedManifest, InjectError> {
  let mut manifest = normalize_file_details(details);
  let mut warnings = Vec::new();

  for stage in options.stages() {
    let entries_in = manifest.len();
    let result = stage.apply(manifest)?;
    debug!(
      stage = stage.name(),
      entries_in,
      entries_out = result.manifest.len(),
      warnings = result.warnings.len(),
      "applied manifest transform"
    );
    manifest = result.manifest;
    warnings.extend(result.warnings);
  }

  Ok(finalize(manifest, warnings))
}

fn finalize(manifest: Vec<SizedManifestEntry>, warnings: Vec<String>) -> TransformedManifest {
  let count = manifest.len();
  let size = manifest.iter().map(|entry| entry.size).sum();
  let entries = manifest
    .into_iter()
    .map(SizedManifestEntry::into_entry)
    .collect();

  TransformedManifest {
    count,
    size,
    entries,
    warnings,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::transforms::transform_fn;
  use crate::models::{ManifestEntry, TransformResult};
  use pretty_assertions::assert_eq;

  fn detail(path: &str, hash: &str, size: u64) -> FileDetail {
    FileDetail {
      path: path.into(),
      content_hash: Some(hash.into()),
      size_bytes: size,
    }
  }

  fn manifest_entry(url: &str, revision: Option<&str>) -> ManifestEntry {
    ManifestEntry {
      integrity: None,
      revision: revision.map(str::to_string),
      url: url.into(),
    }
  }

  #[test]
  fn oversized_files_are_dropped_with_a_warning() {
    let details = [detail("a.js", "abc123", 120), detail("big.js", "def456", 6_000_000)];
    let options = ManifestOptions::new().maximum_file_size_to_cache_in_bytes(5_000_000);

    let result = transform_manifest(&details, &options).unwrap();

    assert_eq!(result.entries, vec![manifest_entry("a.js", Some("abc123"))]);
    assert_eq!(result.count, 1);
    assert_eq!(result.size, 120);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("big.js"));
    assert!(result.warnings[0].contains("6 MB"));
  }

  #[test]
  fn size_filter_runs_before_prefix_rewrite() {
    let details = [
      detail("dist/small.js", "1", 10),
      detail("dist/large.js", "2", 10_000),
    ];
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let observed = seen.clone();
    let options = ManifestOptions::new()
      .additional_manifest_entries(vec![ManifestEntry {
        integrity: None,
        revision: Some("x".into()),
        url: "dist/extra.js".into(),
      }
      .into()])
      .manifest_transform(transform_fn("observe", move |manifest: Vec<SizedManifestEntry>| {
        observed
          .borrow_mut()
          .extend(manifest.iter().map(|entry| entry.url.clone()));
        Ok(TransformResult::new(manifest))
      }))
      .modify_url_prefix(BTreeMap::from([("dist/".to_string(), "/app/".to_string())]))
      .maximum_file_size_to_cache_in_bytes(100);

    let result = transform_manifest(&details, &options).unwrap();

    assert_eq!(*seen.borrow(), vec!["/app/small.js".to_string()]);
    assert_eq!(result.entries, vec![
      manifest_entry("/app/small.js", Some("1")),
      manifest_entry("dist/extra.js", Some("x")),
    ]);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].starts_with("dist/large.js"));
  }

  #[test]
  fn no_options_is_identity_modulo_size() {
    let details = [detail("b.js", "2", 5), detail("a.js", "1", 7)];
    let result = transform_manifest(&details, &ManifestOptions::new()).unwrap();

    assert_eq!(result.entries, vec![
      manifest_entry("b.js", Some("2")),
      manifest_entry("a.js", Some("1")),
    ]);
    assert_eq!(result.count, 2);
    assert_eq!(result.size, 12);
    assert!(result.warnings.is_empty());
  }

  #[test]
  fn zero_size_limit_adds_no_stage() {
    let details = [detail("a.js", "abc123", 120)];
    let options = ManifestOptions::new().maximum_file_size_to_cache_in_bytes(0);

    let result = transform_manifest(&details, &options).unwrap();

    assert_eq!(result.entries, vec![manifest_entry("a.js", Some("abc123"))]);
    assert!(result.warnings.is_empty());
  }

  #[test]
  fn warnings_accumulate_in_stage_order() {
    let details = [detail("huge.bin", "1", 1_000_000)];
    let options = ManifestOptions::new()
      .additional_manifest_entries(vec!["/offline.html".into()])
      .manifest_transform(transform_fn("custom", |manifest: Vec<SizedManifestEntry>| {
        Ok(TransformResult {
          manifest,
          warnings: vec!["custom warning".into()],
        })
      }))
      .maximum_file_size_to_cache_in_bytes(10);

    let result = transform_manifest(&details, &options).unwrap();

    assert_eq!(result.warnings.len(), 3);
    assert!(result.warnings[0].starts_with("huge.bin"));
    assert_eq!(result.warnings[1], "custom warning");
    assert!(result.warnings[2].contains("/offline.html"));
    assert_eq!(result.size, 0);
    assert_eq!(result.count, 1);
  }

  #[test]
  fn failing_stage_aborts_the_pipeline() {
    let options = ManifestOptions::new()
      .manifest_transform(transform_fn("corrupt", |manifest: Vec<SizedManifestEntry>| {
        Ok(TransformResult::new(
          manifest
            .into_iter()
            .map(|mut entry| {
              entry.url.clear();
              entry
            })
            .collect(),
        ))
      }))
      .dont_cache_bust_urls_matching(Regex::new(r"\.js$").unwrap());

    let result = transform_manifest(&[detail("a.js", "1", 1)], &options);
    // Revision suppression runs before caller transforms, so it never sees the corruption.
    assert!(result.is_ok());

    let options = ManifestOptions::new()
      .manifest_transform(transform_fn("corrupt", |manifest: Vec<SizedManifestEntry>| {
        Ok(TransformResult::new(
          manifest
            .into_iter()
            .map(|mut entry| {
              entry.url.clear();
              entry
            })
            .collect(),
        ))
      }))
      .manifest_transform(NoRevisionForUrlsMatchingTransform::new(Regex::new("x").unwrap()));

    let err = transform_manifest(&[detail("a.js", "1", 1)], &options).unwrap_err();
    assert!(matches!(err, InjectError::MissingUrl { .. }));
  }
}
