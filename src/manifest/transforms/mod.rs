//! Built-in manifest transforms and the capability shared with caller-supplied ones.
//!
//! Every transform owns the manifest it is handed and returns the manifest for the next
//! stage, so no stage can observe entries after it has given them up.

mod additional_entries;
mod maximum_size;
mod modify_url_prefix;
mod no_revision;

pub use additional_entries::AdditionalEntriesTransform;
pub use maximum_size::MaximumSizeTransform;
pub use modify_url_prefix::ModifyUrlPrefixTransform;
pub use no_revision::NoRevisionForUrlsMatchingTransform;

use crate::error::InjectError;
use crate::models::{SizedManifestEntry, TransformResult};

/// A single stage of the manifest pipeline.
pub trait ManifestTransform {
  /// Name used in logs and error messages.
  fn name(&self) -> &str;

  /// Transform the manifest, returning the entries for the next stage.
  fn apply(&self, manifest: Vec<SizedManifestEntry>) -> Result<TransformResult, InjectError>;
}

/// Caller transform backed by a closure.
pub struct FnTransform<F> {
  name: String,
  transform: F,
}

/// Wrap a closure as a named manifest transform.
///
/// Errors returned by the closure abort the pipeline as [`InjectError::Transform`].
pub fn transform_fn<F>(name: impl Into<String>, transform: F) -> FnTransform<F>
where
  F: Fn(Vec<SizedManifestEntry>) -> anyhow::Result<TransformResult>,
{
  FnTransform {
    name: name.into(),
    transform,
  }
}

impl<F> ManifestTransform for FnTransform<F>
where
  F: Fn(Vec<SizedManifestEntry>) -> anyhow::Result<TransformResult>,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn apply(&self, manifest: Vec<SizedManifestEntry>) -> Result<TransformResult, InjectError> {
    (self.transform)(manifest).map_err(|err| InjectError::Transform {
      name: self.name.clone(),
      reason: format!("{err:#}"),
    })
  }
}

/// Reject manifests whose entries lost their URL in an earlier stage.
fn ensure_urls(manifest: &[SizedManifestEntry], stage: &'static str) -> Result<(), InjectError> {
  if manifest.iter().any(|entry| entry.url.is_empty()) {
    return Err(InjectError::MissingUrl { stage });
  }
  Ok(())
}
