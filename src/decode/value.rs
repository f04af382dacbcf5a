use serde_json::{Map, Number, Value};

use crate::error::Error;
use crate::text::unescape_to_string;
use crate::types::{Element, Grouping, Payload};
use crate::Result;

/// Decode the outer grouping of a document into a JSON object value.
pub fn grouping_to_value(grouping: &Grouping) -> Result<Value> {
    let mut object = Map::new();
    for element in &grouping.elements {
        object.insert(element.name.clone(), decode_element(element)?);
    }
    Ok(Value::Object(object))
}

/// Decode a single element by its type tag.
pub fn decode_element(element: &Element) -> Result<Value> {
    match &element.payload {
        Payload::Text(raw) => match element.type_tag.as_str() {
            "null" | "bool" | "int" | "float" | "str" => {
                decode_scalar(&element.type_tag, raw)
            }
            "obj" | "list" => Err(Error::codec(format!(
                "Type '{}' requires a grouping payload",
                element.type_tag
            ))),
            other => Err(Error::codec(format!("Unknown type tag: {other}"))),
        },
        Payload::Group(grouping) => match element.type_tag.as_str() {
            "obj" => grouping_to_value(grouping),
            "list" => decode_list(grouping),
            "null" | "bool" | "int" | "float" | "str" => Err(Error::codec(format!(
                "Type '{}' requires a string payload",
                element.type_tag
            ))),
            other => Err(Error::codec(format!("Unknown type tag: {other}"))),
        },
    }
}

/// Decode a scalar payload. Shared with the merge engine so both paths
/// apply identical validation.
pub(crate) fn decode_scalar(type_tag: &str, raw: &str) -> Result<Value> {
    let text = unescape_to_string(raw)?;

    match type_tag {
        "null" => {
            if !text.is_empty() {
                return Err(Error::codec("Null payload must be empty"));
            }
            Ok(Value::Null)
        }
        "bool" => match text.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::codec(format!(
                "Bool payload must be 'true' or 'false', got '{text}'"
            ))),
        },
        "int" => parse_int(&text).map(|i| Value::Number(Number::from(i))),
        "float" => {
            let f = parse_float(&text)?;
            Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| Error::codec(format!("Invalid float value: {text}")))
        }
        "str" => Ok(Value::String(text)),
        other => Err(Error::codec(format!("Unknown type tag: {other}"))),
    }
}

/// Signed 64-bit decimal: optional `-`, then digits only. No `+`, no
/// underscores, no radix prefixes.
pub(crate) fn parse_int(text: &str) -> Result<i64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::codec(format!("Invalid integer value: {text}")));
    }
    text.parse::<i64>()
        .map_err(|_| Error::codec(format!("Invalid integer value: {text}")))
}

/// Standard decimal float grammar. Alphabetic spellings (`inf`, `nan`,
/// radix prefixes) and non-finite results are rejected.
pub(crate) fn parse_float(text: &str) -> Result<f64> {
    let well_formed = !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !well_formed {
        return Err(Error::codec(format!("Invalid float value: {text}")));
    }
    let f = text
        .parse::<f64>()
        .map_err(|_| Error::codec(format!("Invalid float value: {text}")))?;
    if !f.is_finite() {
        return Err(Error::codec(format!("Invalid float value: {text}")));
    }
    Ok(f)
}

/// Extract the `N` of a `_N` list-element name.
pub(crate) fn parse_list_index(name: &str) -> Result<u64> {
    let digits = name.strip_prefix('_').ok_or_else(|| {
        Error::codec(format!("List element name must start with '_': {name}"))
    })?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::codec(format!("Invalid list index: {name}")));
    }
    digits
        .parse::<u64>()
        .map_err(|_| Error::codec(format!("Invalid list index: {name}")))
}

/// Indices need not arrive contiguous or ordered: collect, sort, then
/// densify with nulls in the gaps.
fn decode_list(grouping: &Grouping) -> Result<Value> {
    let mut items: Vec<(u64, Value)> = Vec::with_capacity(grouping.len());
    for element in &grouping.elements {
        let index = parse_list_index(&element.name)?;
        items.push((index, decode_element(element)?));
    }
    items.sort_by_key(|(index, _)| *index);

    let mut array = Vec::new();
    let mut expected = 0u64;
    for (index, value) in items {
        while expected < index {
            array.push(Value::Null);
            expected += 1;
        }
        array.push(value);
        expected = index + 1;
    }
    Ok(Value::Array(array))
}
