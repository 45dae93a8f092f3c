//! Decoding and encoding of the `mappings` table.

use crate::error::InjectError;
use crate::source_map::vlq;

/// One decoded mapping segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
  /// 1-based line in the generated file.
  pub generated_line: u32,
  /// 0-based UTF-16 column in the generated file.
  pub generated_column: u32,
  /// Original location, absent for segments that only mark generated code.
  pub original: Option<OriginalPosition>,
}

/// Original-side half of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalPosition {
  /// Index into the map's `sources`.
  pub source: u32,
  /// 1-based line in the original source.
  pub line: u32,
  /// 0-based column in the original source.
  pub column: u32,
  /// Index into the map's `names`.
  pub name: Option<u32>,
}

#[derive(Default)]
struct Cursor {
  source: i64,
  line: i64,
  column: i64,
  name: i64,
}

/// Decode a `mappings` string in generated-file order.
pub fn decode_mappings(mappings: &str) -> Result<Vec<Mapping>, InjectError> {
  let mut decoded = Vec::new();
  let mut cursor = Cursor::default();

  for (line_index, line) in mappings.split(';').enumerate() {
    let generated_line = to_u32(line_index as i64 + 1, "generated line")?;
    let mut generated_column = 0i64;

    for segment in line.split(',').filter(|segment| !segment.is_empty()) {
      let fields = vlq::decode_segment(segment)?;
      generated_column += fields[0];

      let original = match fields.len() {
        1 => None,
        4 | 5 => {
          cursor.source += fields[1];
          cursor.line += fields[2];
          cursor.column += fields[3];
          let name = if let Some(delta) = fields.get(4) {
            cursor.name += delta;
            Some(to_u32(cursor.name, "name index")?)
          } else {
            None
          };
          Some(OriginalPosition {
            source: to_u32(cursor.source, "source index")?,
            line: to_u32(cursor.line + 1, "original line")?,
            column: to_u32(cursor.column, "original column")?,
            name,
          })
        }
        count => {
          return Err(InjectError::SourceMap {
            reason: format!("segment {segment:?} has {count} fields"),
          });
        }
      };

      decoded.push(Mapping {
        generated_line,
        generated_column: to_u32(generated_column, "generated column")?,
        original,
      });
    }
  }

  Ok(decoded)
}

/// Encode mappings into a `mappings` string.
///
/// Segments are written in generated position order; mappings sharing a position keep
/// their relative order.
pub fn encode_mappings(mappings: &[Mapping]) -> String {
  let mut ordered = mappings.to_vec();
  ordered.sort_by_key(|mapping| (mapping.generated_line, mapping.generated_column));

  let mut out = String::new();
  let mut cursor = Cursor::default();
  let mut current_line = 1;
  let mut previous_column = 0i64;
  let mut first_in_line = true;

  for mapping in &ordered {
    while current_line < mapping.generated_line {
      out.push(';');
      current_line += 1;
      previous_column = 0;
      first_in_line = true;
    }
    if !first_in_line {
      out.push(',');
    }
    first_in_line = false;

    let column = i64::from(mapping.generated_column);
    vlq::encode(column - previous_column, &mut out);
    previous_column = column;

    if let Some(original) = mapping.original {
      let source = i64::from(original.source);
      let line = i64::from(original.line) - 1;
      let column = i64::from(original.column);
      vlq::encode(source - cursor.source, &mut out);
      vlq::encode(line - cursor.line, &mut out);
      vlq::encode(column - cursor.column, &mut out);
      cursor.source = source;
      cursor.line = line;
      cursor.column = column;

      if let Some(name) = original.name {
        let name = i64::from(name);
        vlq::encode(name - cursor.name, &mut out);
        cursor.name = name;
      }
    }
  }

  out
}

fn to_u32(value: i64, what: &str) -> Result<u32, InjectError> {
  u32::try_from(value).map_err(|_| InjectError::SourceMap {
    reason: format!("{what} out of range: {value}"),
  })
}
