//! Serde model of a version 3 source map and lookups over its decoded mappings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::InjectError;
use crate::source_map::mappings::{Mapping, decode_mappings};

/// Version 3 source map as stored on disk.
///
/// Keys this crate does not interpret are kept in `extensions` and written back untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
  /// Format version; only `3` is accepted.
  pub version: u32,
  /// Name of the generated file.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file: Option<String>,
  /// Prefix applied to every entry of `sources`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_root: Option<String>,
  /// Original source names.
  #[serde(default)]
  pub sources: Vec<Option<String>>,
  /// Inlined original source text, parallel to `sources`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sources_content: Option<Vec<Option<String>>>,
  /// Symbol names referenced by mappings.
  #[serde(default)]
  pub names: Vec<String>,
  /// VLQ encoded mapping table.
  pub mappings: String,
  /// Any other top-level keys.
  #[serde(flatten)]
  pub extensions: Map<String, Value>,
}

impl RawSourceMap {
  /// Parse a source map from its JSON text.
  pub fn parse(text: &str) -> Result<Self, InjectError> {
    Self::from_slice(text.as_bytes())
  }

  /// Parse a source map from raw JSON bytes.
  pub fn from_slice(bytes: &[u8]) -> Result<Self, InjectError> {
    let map: RawSourceMap = serde_json::from_slice(bytes).map_err(|err| InjectError::SourceMap {
      reason: err.to_string(),
    })?;
    if map.version != 3 {
      return Err(InjectError::SourceMap {
        reason: format!("unsupported source map version {}", map.version),
      });
    }
    Ok(map)
  }

  /// Serialize the map as compact JSON.
  pub fn to_json(&self) -> Result<String, InjectError> {
    Ok(serde_json::to_string(self)?)
  }

  /// Decode the mapping table for position lookups.
  pub fn decode(&self) -> Result<DecodedSourceMap<'_>, InjectError> {
    let mut mappings = decode_mappings(&self.mappings)?;
    mappings.sort_by_key(|mapping| (mapping.generated_line, mapping.generated_column));
    Ok(DecodedSourceMap {
      raw: self,
      mappings,
    })
  }
}

/// Source map with its mapping table decoded.
#[derive(Debug)]
pub struct DecodedSourceMap<'a> {
  raw: &'a RawSourceMap,
  mappings: Vec<Mapping>,
}

/// Original location resolved for a generated position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalLocation<'a> {
  /// Source file name, as listed in `sources`.
  pub source: Option<&'a str>,
  /// 1-based line in the original source.
  pub line: u32,
  /// 0-based column in the original source.
  pub column: u32,
  /// Symbol name, when the mapping carries one.
  pub name: Option<&'a str>,
}

impl<'a> DecodedSourceMap<'a> {
  /// Mappings sorted by generated position.
  pub fn mappings(&self) -> &[Mapping] {
    &self.mappings
  }

  /// Resolve the closest mapping at or before a generated position on the same line.
  pub fn original_position_for(&self, line: u32, column: u32) -> Option<OriginalLocation<'a>> {
    let end = self
      .mappings
      .partition_point(|mapping| (mapping.generated_line, mapping.generated_column) <= (line, column));
    let mapping = self.mappings[..end].last()?;
    if mapping.generated_line != line {
      return None;
    }

    let original = mapping.original?;
    let raw = self.raw;
    Some(OriginalLocation {
      source: raw
        .sources
        .get(original.source as usize)
        .and_then(|source| source.as_deref()),
      line: original.line,
      column: original.column,
      name: original
        .name
        .and_then(|name| raw.names.get(name as usize))
        .map(String::as_str),
    })
  }
}
