//! Reading, repairing, and writing version 3 source maps.
//!
//! The codec lives in `vlq` and `mappings`; `repair` consumes the replacement spans recorded
//! by the marker substitutor without knowing anything about how they were found.

mod inline;
mod mappings;
mod raw;
mod repair;
mod vlq;

pub use inline::{extract_inline_source_map, find_inline_payload, replace_inline_source_map};
pub use mappings::{Mapping, OriginalPosition, decode_mappings, encode_mappings};
pub use raw::{DecodedSourceMap, OriginalLocation, RawSourceMap};
pub use repair::repair_source_map;
