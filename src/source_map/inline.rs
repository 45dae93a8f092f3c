//! Source maps embedded as base64 data URLs in a trailing `sourceMappingURL` comment.

use std::ops::Range;

use base64::{Engine as _, engine::general_purpose};

use crate::error::InjectError;
use crate::source_map::raw::RawSourceMap;

const COMMENT_PREFIXES: [&str; 2] = ["//# sourceMappingURL=", "//@ sourceMappingURL="];
const DATA_URL_PREFIX: &str = "data:application/json";

/// Byte range of the `data:application/json` URL in the last `sourceMappingURL` comment.
fn find_data_url(text: &str) -> Option<Range<usize>> {
  let url_start = COMMENT_PREFIXES
    .iter()
    .filter_map(|prefix| text.rfind(prefix).map(|start| start + prefix.len()))
    .max()?;

  let line_end = text[url_start..]
    .find(['\n', '\r'])
    .map_or(text.len(), |offset| url_start + offset);
  let url_end = url_start + text[url_start..line_end].trim_end().len();

  text[url_start..url_end]
    .starts_with(DATA_URL_PREFIX)
    .then_some(url_start..url_end)
}

/// Byte range of the base64 payload of the last inline source map comment in `text`.
pub fn find_inline_payload(text: &str) -> Option<Range<usize>> {
  let url = find_data_url(text)?;
  let (params, _) = text[url.clone()].split_once(',')?;
  if !params.split(';').any(|param| param == "base64") {
    return None;
  }
  Some(url.start + params.len() + 1..url.end)
}

/// Decode the inline source map carried by `text`, if there is one.
///
/// Inline maps that are not base64 encoded cannot be rewritten and are reported as errors.
pub fn extract_inline_source_map(text: &str) -> Result<Option<RawSourceMap>, InjectError> {
  let Some(range) = find_inline_payload(text) else {
    return match find_data_url(text) {
      Some(_) => Err(InjectError::SourceMap {
        reason: "inline source map is not base64 encoded".into(),
      }),
      None => Ok(None),
    };
  };

  let bytes = general_purpose::STANDARD
    .decode(&text[range])
    .map_err(|err| InjectError::SourceMap {
      reason: format!("invalid base64 in inline source map: {err}"),
    })?;
  RawSourceMap::from_slice(&bytes).map(Some)
}

/// Replace the payload of the inline source map comment in `text` with `map`.
pub fn replace_inline_source_map(text: &str, map: &RawSourceMap) -> Result<String, InjectError> {
  let range = find_inline_payload(text).ok_or_else(|| InjectError::SourceMap {
    reason: "no inline source map comment to update".into(),
  })?;

  let encoded = general_purpose::STANDARD.encode(map.to_json()?);
  let mut updated = String::with_capacity(text.len() - range.len() + encoded.len());
  updated.push_str(&text[..range.start]);
  updated.push_str(&encoded);
  updated.push_str(&text[range.end..]);
  Ok(updated)
}
