//! Length-bounded splitting.
//!
//! A document too large for the byte budget is decomposed into per-leaf
//! fragments (each a complete single-path SISL document), then greedily
//! packed back together while the packed encoding stays within the budget.
//! Reassembly is the merge engine's job; the packer never deep-merges two
//! fragments that share a top-level key, it flushes instead.

use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::encode::writer::Writer;
use crate::error::Error;
use crate::Result;

#[derive(Clone)]
enum PathComponent {
    Key(String),
    Index(usize),
}

type Path = SmallVec<[PathComponent; 8]>;

struct Leaf {
    path: Path,
    value: Value,
}

/// Split `value` into SISL fragments of at most `max_length` bytes each.
///
/// An empty result means the whole document already fits the budget; the
/// facade emits the full encoding in that case.
pub fn split_value(value: &Value, max_length: usize) -> Result<Vec<String>> {
    if max_length < 2 {
        return Err(Error::codec(format!(
            "max-length {max_length} is too small for any SISL document"
        )));
    }

    let full = crate::encode::to_string(value)?;
    if full.len() <= max_length {
        return Ok(Vec::new());
    }

    let mut leaves = Vec::new();
    collect_leaves(value, &mut Path::new(), &mut leaves);

    let mut fragments = Vec::with_capacity(leaves.len());
    for leaf in leaves {
        let fragment = build_fragment(leaf);
        let encoded = encode_object(&fragment)?;
        if encoded.len() > max_length {
            return Err(Error::codec(format!(
                "max-length too small to encode any fragment (minimum needed: {} bytes)",
                encoded.len()
            )));
        }
        fragments.push((fragment, encoded));
    }

    pack_fragments(fragments, max_length)
}

/// Deterministic pre-order walk: objects in insertion order, lists in index
/// order. Empty objects and arrays count as leaves so no key is lost when
/// the fragments are merged back.
fn collect_leaves(value: &Value, path: &mut Path, leaves: &mut Vec<Leaf>) {
    match value {
        Value::Object(object) if !object.is_empty() => {
            for (key, child) in object {
                path.push(PathComponent::Key(key.clone()));
                collect_leaves(child, path, leaves);
                path.pop();
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                path.push(PathComponent::Index(index));
                collect_leaves(child, path, leaves);
                path.pop();
            }
        }
        _ => leaves.push(Leaf {
            path: path.clone(),
            value: value.clone(),
        }),
    }
}

/// Wrap a leaf from the inside out along its path. List indices become
/// `_N` object keys, the SISL list encoding, so the fragment merges back
/// into the right slot.
fn build_fragment(leaf: Leaf) -> Map<String, Value> {
    let mut current = leaf.value;
    let mut components = leaf.path.into_iter().rev();

    let innermost = components
        .next()
        .map(component_key)
        .unwrap_or_default();
    let mut wrapper = Map::new();
    wrapper.insert(innermost, current);

    for component in components {
        current = Value::Object(wrapper);
        wrapper = Map::new();
        wrapper.insert(component_key(component), current);
    }

    wrapper
}

fn component_key(component: PathComponent) -> String {
    match component {
        PathComponent::Key(key) => key,
        PathComponent::Index(index) => {
            let mut buf = itoa::Buffer::new();
            format!("_{}", buf.format(index))
        }
    }
}

fn encode_object(object: &Map<String, Value>) -> Result<String> {
    let mut writer = Writer::new();
    writer.write_document(object)?;
    Ok(writer.finish())
}

/// Greedy packing in fragment order. A fragment joins the accumulator only
/// if none of its top-level keys is already present and the re-encoded
/// accumulator stays within the budget; otherwise the accumulator is
/// flushed and restarted at the current fragment.
fn pack_fragments(
    fragments: Vec<(Map<String, Value>, String)>,
    max_length: usize,
) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    let mut iter = fragments.into_iter();

    let Some((mut combined, mut combined_encoded)) = iter.next() else {
        return Ok(parts);
    };

    for (fragment, fragment_encoded) in iter {
        let overlaps = fragment.keys().any(|key| combined.contains_key(key));
        if !overlaps {
            let mut tentative = combined.clone();
            tentative.extend(fragment.clone());
            let tentative_encoded = encode_object(&tentative)?;
            if tentative_encoded.len() <= max_length {
                combined = tentative;
                combined_encoded = tentative_encoded;
                continue;
            }
        }

        parts.push(combined_encoded);
        combined = fragment;
        combined_encoded = fragment_encoded;
    }

    parts.push(combined_encoded);
    Ok(parts)
}
