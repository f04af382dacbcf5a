//! Codec between JSON values and SISL, a typed brace-delimited interchange
//! format, with length-bounded splitting and multi-fragment merging.
//!
//! # Examples
//!
//! Encode and decode:
//!
//! ```rust
//! use serde_json::json;
//!
//! let value = json!({"a": true, "b": null, "c": [1, 2]});
//! let sisl = sisl::encode(&value)?;
//! assert_eq!(
//!     sisl,
//!     "{a: !bool \"true\", b: !null \"\", c: !list {_0: !int \"1\", _1: !int \"2\"}}"
//! );
//! assert_eq!(sisl::decode(&sisl)?, value);
//! # Ok::<(), sisl::Error>(())
//! ```
//!
//! Lists are addressed by explicit `_N` indices, so fragments may arrive
//! sparse; gaps densify to `null`:
//!
//! ```rust
//! use serde_json::json;
//!
//! let value = sisl::decode("{xs: !list {_0: !int \"10\", _2: !int \"30\"}}")?;
//! assert_eq!(value, json!({"xs": [10, null, 30]}));
//! # Ok::<(), sisl::Error>(())
//! ```
//!
//! Merge partial documents, later primitives winning:
//!
//! ```rust
//! use serde_json::json;
//!
//! let merged = sisl::merge(&["{a: !int \"1\"}", "{b: !str \"x\"}", "{a: !int \"2\"}"])?;
//! assert_eq!(merged, json!({"a": 2, "b": "x"}));
//! # Ok::<(), sisl::Error>(())
//! ```
//!
//! Split under a byte budget and reassemble:
//!
//! ```rust
//! use serde_json::json;
//!
//! let value = json!({"abc": 2, "def": 3});
//! let parts = sisl::split(&value, 20)?;
//! assert_eq!(parts, ["{abc: !int \"2\"}", "{def: !int \"3\"}"]);
//! assert_eq!(sisl::merge(&parts)?, value);
//! # Ok::<(), sisl::Error>(())
//! ```

pub mod decode;
pub mod encode;
pub mod error;
pub mod merge;
pub mod split;
pub mod text;
pub mod types;
pub mod xml;

pub use crate::error::{Error, ErrorKind, Location};
pub use crate::text::{escape, unescape, unescape_to_string};
pub use crate::types::{Element, Grouping, Payload};
pub use crate::xml::{value_to_xml, xml_to_value};
pub use serde_json::Value;

pub type Result<T> = std::result::Result<T, Error>;

/// Encode a JSON value (object at the top level) as one SISL document.
pub fn encode(value: &Value) -> Result<String> {
    encode::to_string(value)
}

/// Decode one SISL document into a JSON value.
pub fn decode(input: &str) -> Result<Value> {
    decode::from_str(input)
}

/// Merge SISL documents left-to-right into one JSON value.
pub fn merge<I: AsRef<str>>(inputs: &[I]) -> Result<Value> {
    merge::merge_documents(inputs)
}

/// Split a JSON value into SISL fragments of at most `max_length` bytes.
///
/// A value whose full encoding fits the budget comes back as that single
/// encoding; otherwise each fragment is independently decodable and the
/// in-order [`merge`] of all fragments reproduces the value.
pub fn split(value: &Value, max_length: usize) -> Result<Vec<String>> {
    let parts = split::split_value(value, max_length)?;
    if parts.is_empty() {
        return Ok(vec![encode(value)?]);
    }
    Ok(parts)
}
