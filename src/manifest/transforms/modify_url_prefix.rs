use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::InjectError;
use crate::manifest::transforms::{ManifestTransform, ensure_urls};
use crate::models::{SizedManifestEntry, TransformResult};

/// Rewrites the leading prefix of each URL according to a prefix → replacement table.
#[derive(Debug, Clone, Default)]
pub struct ModifyUrlPrefixTransform {
  // Longest prefix first, so the most specific rule wins.
  prefixes: Vec<(String, String)>,
}

impl ModifyUrlPrefixTransform {
  /// Build the transform from a typed prefix table.
  pub fn new(prefixes: BTreeMap<String, String>) -> Self {
    let mut prefixes: Vec<(String, String)> = prefixes.into_iter().collect();
    prefixes.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    Self { prefixes }
  }

  /// Build the transform from untyped configuration, validating its shape.
  pub fn from_value(value: &Value) -> Result<Self, InjectError> {
    let Value::Object(map) = value else {
      return Err(InjectError::InvalidUrlPrefixMap);
    };

    let mut prefixes = BTreeMap::new();
    for (prefix, replacement) in map {
      let Value::String(replacement) = replacement else {
        return Err(InjectError::InvalidUrlPrefixMap);
      };
      prefixes.insert(prefix.clone(), replacement.clone());
    }

    Ok(Self::new(prefixes))
  }

  fn rewrite(&self, url: &str) -> Option<String> {
    self.prefixes.iter().find_map(|(prefix, replacement)| {
      url
        .strip_prefix(prefix.as_str())
        .map(|rest| format!("{replacement}{rest}"))
    })
  }
}

impl ManifestTransform for ModifyUrlPrefixTransform {
  fn name(&self) -> &str {
    "modifyURLPrefix"
  }

  fn apply(&self, mut manifest: Vec<SizedManifestEntry>) -> Result<TransformResult, InjectError> {
    if self.prefixes.is_empty() {
      return Ok(TransformResult::new(manifest));
    }

    ensure_urls(&manifest, "modifyURLPrefix")?;
    for entry in &mut manifest {
      if let Some(url) = self.rewrite(&entry.url) {
        entry.url = url;
      }
    }

    Ok(TransformResult::new(manifest))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::transforms::tests::entry;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  fn urls(result: &TransformResult) -> Vec<&str> {
    result.manifest.iter().map(|entry| entry.url.as_str()).collect()
  }

  #[test]
  fn rewrites_only_anchored_prefixes() {
    let transform = ModifyUrlPrefixTransform::from_value(&json!({
      "dist/": "/static/",
    }))
    .unwrap();

    let result = transform
      .apply(vec![entry("dist/app.js", None, 1), entry("img/dist/logo.png", None, 1)])
      .unwrap();

    assert_eq!(urls(&result), vec!["/static/app.js", "img/dist/logo.png"]);
  }

  #[test]
  fn prefers_the_longest_matching_prefix_and_rewrites_once() {
    let transform = ModifyUrlPrefixTransform::from_value(&json!({
      "/": "/root/",
      "/assets/": "https://cdn.test/",
      "": "unused-",
    }))
    .unwrap();

    let result = transform
      .apply(vec![entry("/assets/a.png", None, 1), entry("/index.html", None, 1)])
      .unwrap();

    assert_eq!(urls(&result), vec!["https://cdn.test/a.png", "/root/index.html"]);
  }

  #[test]
  fn empty_replacement_strips_the_prefix() {
    let transform = ModifyUrlPrefixTransform::from_value(&json!({"build/": ""})).unwrap();
    let result = transform.apply(vec![entry("build/app.js", None, 1)]).unwrap();
    assert_eq!(urls(&result), vec!["app.js"]);
  }

  #[test]
  fn empty_table_is_identity() {
    let transform = ModifyUrlPrefixTransform::from_value(&json!({})).unwrap();
    let manifest = vec![entry("a.js", Some("1"), 4), entry("", None, 0)];
    let result = transform.apply(manifest.clone()).unwrap();
    assert_eq!(result.manifest, manifest);
    assert!(result.warnings.is_empty());
  }

  #[test]
  fn rejects_malformed_configuration() {
    for value in [json!(["a"]), json!("prefix"), json!(null), json!({"a": 1})] {
      let err = ModifyUrlPrefixTransform::from_value(&value).unwrap_err();
      assert!(matches!(err, InjectError::InvalidUrlPrefixMap));
    }
  }

  #[test]
  fn rejects_entries_without_urls() {
    let transform = ModifyUrlPrefixTransform::from_value(&json!({"a": "b"})).unwrap();
    let err = transform.apply(vec![entry("", None, 0)]).unwrap_err();
    assert!(matches!(err, InjectError::MissingUrl { .. }));
  }
}
