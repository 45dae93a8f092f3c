//! Configuration loader describing how the precache manifest is built and injected.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::InjectError;
use crate::inject::{DEFAULT_INJECTION_POINT, ManifestInjector};
use crate::manifest::ManifestOptions;
use crate::manifest::transforms::ModifyUrlPrefixTransform;
use crate::models::{AdditionalEntry, FileDetail};

/// File name searched for by [`InjectManifestConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "inject-manifest.config.json";

/// Options recognised when generating and injecting a precache manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InjectManifestConfig {
  /// Name of the service worker output the manifest is injected into.
  pub sw_dest: Option<String>,
  /// Marker replaced by the serialized manifest.
  pub injection_point: String,
  /// Public path build outputs are served from.
  pub public_path: Option<String>,
  /// Entries larger than this many bytes are left out of the manifest.
  pub maximum_file_size_to_cache_in_bytes: Option<u64>,
  /// Prefix → replacement table, validated when the options are compiled.
  #[serde(rename = "modifyURLPrefix")]
  pub modify_url_prefix: Option<Value>,
  /// Regular expression selecting URLs that never get a revision.
  #[serde(rename = "dontCacheBustURLsMatching")]
  pub dont_cache_bust_urls_matching: Option<String>,
  /// Literal entries appended to the manifest.
  pub additional_manifest_entries: Option<Vec<AdditionalEntry>>,
}

impl Default for InjectManifestConfig {
  fn default() -> Self {
    Self {
      sw_dest: None,
      injection_point: DEFAULT_INJECTION_POINT.into(),
      public_path: None,
      maximum_file_size_to_cache_in_bytes: None,
      modify_url_prefix: None,
      dont_cache_bust_urls_matching: None,
      additional_manifest_entries: None,
    }
  }
}

impl InjectManifestConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or unreadable configuration file falls back to the defaults.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Ok(config) => config,
      Err(err) => {
        debug!("using default configuration: {err:#}");
        Self::default()
      }
    }
  }

  /// Read configuration from a JSON or YAML file, chosen by extension.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = path
      .extension()
      .is_some_and(|ext| ext == "yaml" || ext == "yml");

    if is_yaml {
      serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse YAML configuration {}", path.display()))
    } else {
      Self::from_json(&content)
        .with_context(|| format!("failed to parse JSON configuration {}", path.display()))
    }
  }

  /// Parse configuration from JSON text.
  pub fn from_json(content: &str) -> Result<Self> {
    Ok(serde_json::from_str(content)?)
  }

  /// Compile the configured options into pipeline stages.
  ///
  /// Caller transforms can be added to the returned options before injecting.
  pub fn manifest_options(&self) -> Result<ManifestOptions, InjectError> {
    let mut options = ManifestOptions::new();
    if let Some(bytes) = self.maximum_file_size_to_cache_in_bytes.filter(|&bytes| bytes > 0) {
      options = options.maximum_file_size_to_cache_in_bytes(bytes);
    }
    if let Some(prefixes) = &self.modify_url_prefix {
      options = options.modify_url_prefix_transform(ModifyUrlPrefixTransform::from_value(prefixes)?);
    }
    if let Some(pattern) = &self.dont_cache_bust_urls_matching {
      options = options.dont_cache_bust_urls_matching(Regex::new(pattern)?);
    }
    if let Some(entries) = &self.additional_manifest_entries {
      options = options.additional_manifest_entries(entries.clone());
    }
    Ok(options)
  }

  /// Build an injector from these settings and the given pipeline options.
  pub fn injector_with(&self, options: ManifestOptions) -> ManifestInjector {
    let mut injector = ManifestInjector::new(self.injection_point.clone(), options);
    if let Some(sw_dest) = &self.sw_dest {
      injector = injector.with_sw_dest(sw_dest.clone());
    }
    if let Some(public_path) = &self.public_path {
      injector = injector.with_public_path(public_path.clone());
    }
    injector
  }

  /// Build an injector using only the configured options.
  pub fn injector(&self) -> Result<ManifestInjector, InjectError> {
    Ok(self.injector_with(self.manifest_options()?))
  }

  /// Describe a build asset using the configured public path.
  pub fn file_detail(&self, name: &str, content_hash: Option<String>, size_bytes: u64) -> FileDetail {
    FileDetail::from_asset(self.public_path.as_deref(), name, content_hash, size_bytes)
  }
}
