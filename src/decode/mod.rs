pub mod lexer;
pub mod parser;
pub mod value;

use serde_json::Value;

use crate::Result;

/// Decode a single SISL document into a JSON value.
pub fn from_str(input: &str) -> Result<Value> {
    let grouping = parser::parse_document(input)?;
    value::grouping_to_value(&grouping)
}
