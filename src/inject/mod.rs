//! Injecting the generated manifest into a service worker and keeping its source map in step.

pub mod marker;

use tracing::{debug, info};

use crate::error::InjectError;
use crate::format::pretty_bytes;
use crate::inject::marker::{ensure_marker, substitute_marker, substitute_marker_tracked};
use crate::manifest::normalize::resolve_public_url;
use crate::manifest::{GeneratedManifest, ManifestOptions, generate_manifest};
use crate::models::{FileDetail, ManifestEntry};
use crate::source_map::{
  RawSourceMap, extract_inline_source_map, repair_source_map, replace_inline_source_map,
};

/// Marker replaced by the manifest when no other injection point is configured.
pub const DEFAULT_INJECTION_POINT: &str = "self.__WB_MANIFEST";

/// Updated service worker artifacts produced by [`ManifestInjector::inject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionOutput {
  /// Service worker source with the manifest spliced in.
  pub source: String,
  /// Repaired external source map, when one was supplied.
  pub source_map: Option<String>,
  /// Precached entries, sorted by URL.
  pub entries: Vec<ManifestEntry>,
  /// Total size in bytes of the precached build outputs.
  pub size: u64,
  /// Data-quality warnings collected while generating the manifest.
  pub warnings: Vec<String>,
}

impl InjectionOutput {
  /// Number of precached URLs.
  pub fn count(&self) -> usize {
    self.entries.len()
  }
}

/// High-level helper splicing a precache manifest into a service worker.
pub struct ManifestInjector {
  options: ManifestOptions,
  injection_point: String,
  sw_dest: Option<String>,
  public_path: Option<String>,
}

impl ManifestInjector {
  /// Create an injector replacing `injection_point` with the manifest built from `options`.
  pub fn new(injection_point: impl Into<String>, options: ManifestOptions) -> Self {
    Self {
      options,
      injection_point: injection_point.into(),
      sw_dest: None,
      public_path: None,
    }
  }

  /// Name of the service worker output, recorded as the repaired map's `file`.
  pub fn with_sw_dest(mut self, sw_dest: impl Into<String>) -> Self {
    self.sw_dest = Some(sw_dest.into());
    self
  }

  /// Public path the build outputs are served from, used to recognise the worker's own files.
  pub fn with_public_path(mut self, public_path: impl Into<String>) -> Self {
    self.public_path = Some(public_path.into());
    self
  }

  /// Marker this injector replaces.
  pub fn injection_point(&self) -> &str {
    &self.injection_point
  }

  /// Generate the manifest for `details` and splice it into `source`.
  ///
  /// The service worker itself and its `.map` file are never precached.
  /// When `source_map` is given it is repaired to match the new text. Without one, an
  /// inline base64 source map at the end of `source` is repaired in place. Nothing is
  /// returned unless the marker was found and every stage succeeded.
  pub fn inject(
    &self,
    details: &[FileDetail],
    source: &str,
    source_map: Option<&str>,
  ) -> Result<InjectionOutput, InjectError> {
    let occurrences = ensure_marker(source, &self.injection_point)?;
    debug!(
      marker = %self.injection_point,
      occurrences,
      "found injection point"
    );

    let GeneratedManifest {
      entries,
      json,
      size,
      warnings,
    } = generate_manifest(&self.precachable(details), &self.options)?;

    let (source, source_map) = match source_map {
      Some(map_text) => {
        let map = RawSourceMap::parse(map_text)?;
        let (text, map) = self.replace_with_map(source, &map, &json)?;
        (text, Some(map.to_json()?))
      }
      None => match extract_inline_source_map(source)? {
        Some(map) => {
          let (text, map) = self.replace_with_map(source, &map, &json)?;
          (replace_inline_source_map(&text, &map)?, None)
        }
        None => (
          substitute_marker(source, &self.injection_point, &json)?,
          None,
        ),
      },
    };

    info!(
      "The service worker at {} will precache {} URLs, totaling {}.",
      self.sw_dest.as_deref().unwrap_or("<unnamed>"),
      entries.len(),
      pretty_bytes(size)
    );

    Ok(InjectionOutput {
      source,
      source_map,
      entries,
      size,
      warnings,
    })
  }

  fn precachable(&self, details: &[FileDetail]) -> Vec<FileDetail> {
    let Some(sw_dest) = &self.sw_dest else {
      return details.to_vec();
    };
    let public_path = self.public_path.as_deref();
    let own_outputs = [
      resolve_public_url(public_path, sw_dest),
      resolve_public_url(public_path, &format!("{sw_dest}.map")),
    ];

    let kept: Vec<FileDetail> = details
      .iter()
      .filter(|detail| !own_outputs.contains(&detail.path.replace('\\', "/")))
      .cloned()
      .collect();
    if kept.len() < details.len() {
      debug!(
        sw_dest = %sw_dest,
        excluded = details.len() - kept.len(),
        "left the service worker out of its own manifest"
      );
    }
    kept
  }

  fn replace_with_map(
    &self,
    source: &str,
    map: &RawSourceMap,
    replacement: &str,
  ) -> Result<(String, RawSourceMap), InjectError> {
    let substitution = substitute_marker_tracked(source, &self.injection_point, replacement)?;
    let mut repaired = repair_source_map(map, &substitution.spans, substitution.column_shift)?;
    if let Some(sw_dest) = &self.sw_dest {
      repaired.file = Some(sw_dest.clone());
    }
    Ok((substitution.text, repaired))
  }
}
