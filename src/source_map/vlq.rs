//! Base64 variable-length quantities used by the `mappings` field.

use crate::error::InjectError;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const CONTINUATION: u8 = 0b10_0000;
const DIGIT_MASK: u64 = 0b1_1111;

/// Append the VLQ encoding of `value` to `out`.
pub fn encode(value: i64, out: &mut String) {
  let mut remaining = (value.unsigned_abs() << 1) | u64::from(value < 0);
  loop {
    let mut digit = (remaining & DIGIT_MASK) as u8;
    remaining >>= 5;
    if remaining > 0 {
      digit |= CONTINUATION;
    }
    out.push(char::from(ALPHABET[usize::from(digit)]));
    if remaining == 0 {
      break;
    }
  }
}

/// Decode every value packed into one comma-free segment.
pub fn decode_segment(segment: &str) -> Result<Vec<i64>, InjectError> {
  let mut values = Vec::new();
  let mut accumulated: u64 = 0;
  let mut shift = 0u32;
  let mut pending = false;

  for byte in segment.bytes() {
    let digit = decode_digit(byte).ok_or_else(|| InjectError::SourceMap {
      reason: format!("invalid base64 character {:?} in mappings", char::from(byte)),
    })?;
    if shift > 60 {
      return Err(InjectError::SourceMap {
        reason: format!("VLQ value overflows in segment {segment:?}"),
      });
    }

    accumulated |= u64::from(digit & 0b1_1111) << shift;
    if digit & CONTINUATION != 0 {
      shift += 5;
      pending = true;
      continue;
    }

    let magnitude = (accumulated >> 1) as i64;
    values.push(if accumulated & 1 == 1 { -magnitude } else { magnitude });
    accumulated = 0;
    shift = 0;
    pending = false;
  }

  if pending {
    return Err(InjectError::SourceMap {
      reason: format!("unterminated VLQ value in segment {segment:?}"),
    });
  }
  Ok(values)
}

fn decode_digit(byte: u8) -> Option<u8> {
  match byte {
    b'A'..=b'Z' => Some(byte - b'A'),
    b'a'..=b'z' => Some(byte - b'a' + 26),
    b'0'..=b'9' => Some(byte - b'0' + 52),
    b'+' => Some(62),
    b'/' => Some(63),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn encoded(value: i64) -> String {
    let mut out = String::new();
    encode(value, &mut out);
    out
  }

  #[test]
  fn encodes_known_values() {
    assert_eq!(encoded(0), "A");
    assert_eq!(encoded(1), "C");
    assert_eq!(encoded(-1), "D");
    assert_eq!(encoded(15), "e");
    assert_eq!(encoded(16), "gB");
    assert_eq!(encoded(-17), "jB");
    assert_eq!(encoded(500), "of");
    assert_eq!(encoded(1000), "w+B");
  }

  #[test]
  fn decodes_packed_segments() {
    assert_eq!(decode_segment("AAgBC").unwrap(), vec![0, 0, 16, 1]);
    assert_eq!(decode_segment("pfjBw+B").unwrap(), vec![-500, -17, 1000]);
  }

  #[test]
  fn rejects_malformed_segments() {
    assert!(decode_segment("A*").is_err());
    assert!(decode_segment("g").is_err());
  }
}
