//! Multi-fragment merge.
//!
//! Each input document is parsed and converted into a mergeable tree that
//! keeps list indices sparse, then the trees are folded left-to-right.
//! Structural positions are left-biased (the first document's key order
//! wins) and primitives are right-biased (a later fragment overwrites an
//! earlier value).

use std::collections::BTreeMap;
use std::mem;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::decode::parser::parse_document;
use crate::decode::value::{decode_scalar, parse_list_index};
use crate::error::Error;
use crate::types::{Element, Grouping, Payload};
use crate::Result;

/// Mirror of the value tree in which lists are sparse maps from index to
/// node, so gaps survive until finalization and later fragments can fill
/// them.
enum Mergeable {
    Object(IndexMap<String, Mergeable>),
    List(BTreeMap<u64, Mergeable>),
    Primitive(Value),
}

impl Mergeable {
    fn from_element(element: &Element) -> Result<Self> {
        match &element.payload {
            Payload::Text(raw) => match element.type_tag.as_str() {
                "null" | "bool" | "int" | "float" | "str" => {
                    Ok(Mergeable::Primitive(decode_scalar(&element.type_tag, raw)?))
                }
                "obj" | "list" => Err(Error::codec(format!(
                    "Type '{}' requires a grouping payload",
                    element.type_tag
                ))),
                other => Err(Error::codec(format!("Unknown type tag: {other}"))),
            },
            Payload::Group(grouping) => match element.type_tag.as_str() {
                "obj" => Self::from_object_grouping(grouping),
                "list" => {
                    let mut entries = BTreeMap::new();
                    for child in &grouping.elements {
                        let index = parse_list_index(&child.name)?;
                        entries.insert(index, Self::from_element(child)?);
                    }
                    Ok(Mergeable::List(entries))
                }
                "null" | "bool" | "int" | "float" | "str" => Err(Error::codec(format!(
                    "Type '{}' requires a string payload",
                    element.type_tag
                ))),
                other => Err(Error::codec(format!("Unknown type tag: {other}"))),
            },
        }
    }

    /// The outer grouping of a document is treated as an object.
    fn from_object_grouping(grouping: &Grouping) -> Result<Self> {
        let mut entries = IndexMap::new();
        for element in &grouping.elements {
            entries.insert(element.name.clone(), Self::from_element(element)?);
        }
        Ok(Mergeable::Object(entries))
    }

    /// Densify: sparse lists become arrays of length max-index + 1 with
    /// nulls in the gaps, mirroring the value codec's list rule.
    fn into_value(self) -> Value {
        match self {
            Mergeable::Object(entries) => {
                let mut object = Map::new();
                for (key, node) in entries {
                    object.insert(key, node.into_value());
                }
                Value::Object(object)
            }
            Mergeable::List(entries) => {
                let mut array = Vec::new();
                let mut expected = 0u64;
                for (index, node) in entries {
                    while expected < index {
                        array.push(Value::Null);
                        expected += 1;
                    }
                    array.push(node.into_value());
                    expected = index + 1;
                }
                Value::Array(array)
            }
            Mergeable::Primitive(value) => value,
        }
    }
}

fn merge_nodes(a: Mergeable, b: Mergeable) -> Result<Mergeable> {
    match (a, b) {
        (Mergeable::Object(mut entries), Mergeable::Object(incoming)) => {
            for (key, node) in incoming {
                match entries.entry(key) {
                    indexmap::map::Entry::Occupied(mut slot) => {
                        // Recursive merge in place: the key keeps its
                        // original position.
                        let prev = mem::replace(slot.get_mut(), Mergeable::Primitive(Value::Null));
                        *slot.get_mut() = merge_nodes(prev, node)?;
                    }
                    indexmap::map::Entry::Vacant(slot) => {
                        slot.insert(node);
                    }
                }
            }
            Ok(Mergeable::Object(entries))
        }
        (Mergeable::List(mut entries), Mergeable::List(incoming)) => {
            for (index, node) in incoming {
                match entries.entry(index) {
                    std::collections::btree_map::Entry::Occupied(mut slot) => {
                        let prev = mem::replace(slot.get_mut(), Mergeable::Primitive(Value::Null));
                        *slot.get_mut() = merge_nodes(prev, node)?;
                    }
                    std::collections::btree_map::Entry::Vacant(slot) => {
                        slot.insert(node);
                    }
                }
            }
            Ok(Mergeable::List(entries))
        }
        (Mergeable::Primitive(_), Mergeable::Primitive(replacement)) => {
            Ok(Mergeable::Primitive(replacement))
        }
        _ => Err(Error::codec("Type conflict during merge")),
    }
}

/// Merge SISL documents left-to-right into one JSON value. An empty input
/// slice yields an empty object.
pub fn merge_documents<I: AsRef<str>>(inputs: &[I]) -> Result<Value> {
    let Some((first, rest)) = inputs.split_first() else {
        return Ok(Value::Object(Map::new()));
    };

    let grouping = parse_document(first.as_ref())?;
    let mut merged = Mergeable::from_object_grouping(&grouping)?;

    for input in rest {
        let grouping = parse_document(input.as_ref())?;
        let next = Mergeable::from_object_grouping(&grouping)?;
        merged = merge_nodes(merged, next)?;
    }

    Ok(merged.into_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_empty_input_is_empty_object() {
        let inputs: [&str; 0] = [];
        assert_eq!(merge_documents(&inputs).unwrap(), json!({}));
    }

    #[rstest]
    fn test_disjoint_keys_append_in_order() {
        let merged =
            merge_documents(&["{a: !int \"1\"}", "{b: !str \"x\"}", "{c: !bool \"true\"}"])
                .unwrap();
        assert_eq!(merged, json!({"a": 1, "b": "x", "c": true}));
        let keys: Vec<&String> = merged.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[rstest]
    fn test_primitive_right_wins() {
        let merged = merge_documents(&["{a: !int \"1\"}", "{a: !int \"2\"}"]).unwrap();
        assert_eq!(merged, json!({"a": 2}));
    }

    #[rstest]
    fn test_primitive_replacement_may_change_type() {
        let merged = merge_documents(&["{a: !int \"1\"}", "{a: !str \"two\"}"]).unwrap();
        assert_eq!(merged, json!({"a": "two"}));
    }

    #[rstest]
    fn test_replaced_key_keeps_position() {
        let merged =
            merge_documents(&["{a: !int \"1\", b: !int \"2\"}", "{a: !int \"9\"}"]).unwrap();
        let keys: Vec<&String> = merged.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(merged, json!({"a": 9, "b": 2}));
    }

    #[rstest]
    fn test_nested_list_merge_fills_overlap() {
        let merged = merge_documents(&[
            "{abc: !list {_0: !str \"I\", _1: !list {_0: !str \"am\"}}}",
            "{abc: !list {_1: !list {_1: !str \"a\"}, _2: !str \"list\"}}",
        ])
        .unwrap();
        assert_eq!(merged, json!({"abc": ["I", ["am", "a"], "list"]}));
    }

    #[rstest]
    fn test_disjoint_list_indices_stay_sparse_until_finalize() {
        let merged = merge_documents(&[
            "{abc: !list {_0: !str \"I\", _1: !list {_0: !str \"am\"}}}",
            "{abc: !list {_2: !list {_0: !str \"a\"}, _3: !str \"list\"}}",
        ])
        .unwrap();
        assert_eq!(merged, json!({"abc": ["I", ["am"], ["a"], "list"]}));
    }

    #[rstest]
    fn test_gap_left_unfilled_becomes_null() {
        let merged =
            merge_documents(&["{xs: !list {_0: !int \"1\"}}", "{xs: !list {_2: !int \"3\"}}"])
                .unwrap();
        assert_eq!(merged, json!({"xs": [1, null, 3]}));
    }

    #[rstest]
    #[case(&["{a: !int \"1\"}", "{a: !obj {}}"])]
    #[case(&["{a: !list {}}", "{a: !obj {}}"])]
    #[case(&["{a: !obj {}}", "{a: !int \"1\"}"])]
    fn test_kind_conflict(#[case] inputs: &[&str]) {
        let err = merge_documents(inputs).unwrap_err();
        assert!(err.to_string().contains("Type conflict"));
    }

    #[rstest]
    fn test_fold_is_left_to_right() {
        let merged = merge_documents(&[
            "{a: !int \"1\"}",
            "{a: !int \"2\", b: !int \"10\"}",
            "{a: !int \"3\"}",
        ])
        .unwrap();
        assert_eq!(merged, json!({"a": 3, "b": 10}));
    }

    #[rstest]
    fn test_associative_on_disjoint_overlaps() {
        let a = "{x: !obj {p: !int \"1\"}}";
        let b = "{x: !obj {q: !int \"2\"}}";
        let c = "{y: !int \"3\"}";

        let all_at_once = merge_documents(&[a, b, c]).unwrap();
        let expected = json!({"x": {"p": 1, "q": 2}, "y": 3});
        assert_eq!(all_at_once, expected);
    }

    #[rstest]
    fn test_invalid_fragment_surfaces_parse_error() {
        let err = merge_documents(&["{a: !int \"1\"}", "{oops"]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Parse);
    }
}
