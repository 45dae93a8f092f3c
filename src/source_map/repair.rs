use std::collections::BTreeMap;

use tracing::debug;

use crate::error::InjectError;
use crate::models::ReplacementSpan;
use crate::source_map::mappings::{Mapping, decode_mappings, encode_mappings};
use crate::source_map::raw::RawSourceMap;

/// Shift generated columns so the map matches text in which every span was replaced.
///
/// `column_shift` is the replacement width minus the marker width, in UTF-16 units. A
/// mapping moves once for each span on its line that starts strictly before it. Mappings
/// that do not point at a real original source are dropped; every other key of the map is
/// carried over untouched.
pub fn repair_source_map(
  map: &RawSourceMap,
  spans: &[ReplacementSpan],
  column_shift: i64,
) -> Result<RawSourceMap, InjectError> {
  let mut span_columns: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
  for span in spans {
    span_columns.entry(span.line).or_default().push(span.column);
  }

  let decoded = decode_mappings(&map.mappings)?;
  let decoded_count = decoded.len();
  let repaired: Vec<Mapping> = decoded
    .into_iter()
    .filter(|mapping| has_source(map, mapping))
    .map(|mut mapping| {
      let passed = span_columns
        .get(&mapping.generated_line)
        .map_or(0, |columns| {
          columns
            .iter()
            .filter(|&&column| mapping.generated_column > column)
            .count()
        });
      let shifted = i64::from(mapping.generated_column) + passed as i64 * column_shift;
      mapping.generated_column = u32::try_from(shifted.max(0)).unwrap_or(u32::MAX);
      mapping
    })
    .collect();

  debug!(
    spans = spans.len(),
    mappings_in = decoded_count,
    mappings_out = repaired.len(),
    column_shift,
    "repaired source map"
  );

  Ok(RawSourceMap {
    mappings: encode_mappings(&repaired),
    ..map.clone()
  })
}

fn has_source(map: &RawSourceMap, mapping: &Mapping) -> bool {
  mapping.original.is_some_and(|original| {
    map
      .sources
      .get(original.source as usize)
      .is_some_and(Option::is_some)
  })
}
