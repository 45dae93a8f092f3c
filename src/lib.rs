#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod format;
pub mod inject;
pub mod manifest;
pub mod models;
pub mod source_map;

pub use config::InjectManifestConfig;
pub use error::InjectError;
pub use inject::{DEFAULT_INJECTION_POINT, InjectionOutput, ManifestInjector};
pub use manifest::transforms::{ManifestTransform, transform_fn};
pub use manifest::{GeneratedManifest, ManifestOptions, generate_manifest, transform_manifest};
pub use models::{
  AdditionalEntry, FileDetail, ManifestEntry, ReplacementSpan, SizedManifestEntry, TransformResult,
  TransformedManifest,
};
