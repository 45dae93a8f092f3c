use crate::error::InjectError;
use crate::format::pretty_bytes;
use crate::manifest::transforms::ManifestTransform;
use crate::models::{SizedManifestEntry, TransformResult};

/// Drops entries larger than a byte threshold, warning once per dropped entry.
#[derive(Debug, Clone, Copy)]
pub struct MaximumSizeTransform {
  maximum_bytes: u64,
}

impl MaximumSizeTransform {
  /// Keep entries of at most `maximum_bytes`.
  pub fn new(maximum_bytes: u64) -> Self {
    Self { maximum_bytes }
  }
}

impl ManifestTransform for MaximumSizeTransform {
  fn name(&self) -> &str {
    "maximumFileSizeToCacheInBytes"
  }

  fn apply(&self, manifest: Vec<SizedManifestEntry>) -> Result<TransformResult, InjectError> {
    let mut warnings = Vec::new();
    let manifest = manifest
      .into_iter()
      .filter(|entry| {
        if entry.size <= self.maximum_bytes {
          return true;
        }
        warnings.push(format!(
          "{} is {}, and won't be precached. Configure maximumFileSizeToCacheInBytes to change this limit.",
          entry.url,
          pretty_bytes(entry.size)
        ));
        false
      })
      .collect();

    Ok(TransformResult { manifest, warnings })
  }
}
