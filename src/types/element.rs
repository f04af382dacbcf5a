//! The SISL element tree produced by the parser.
//!
//! An element is a `(name, type_tag, payload)` triple; a grouping is an
//! ordered sequence of elements enclosed in braces. The parser carries the
//! type tag as raw text. Tag validity is the value codec's concern, which
//! keeps the tree reusable by the merge engine.

/// A single named, typed entry of a grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub type_tag: String,
    pub payload: Payload,
}

/// An element's payload: a raw string literal or a nested grouping.
///
/// `Text` holds the literal's inner bytes with escape sequences still
/// intact; callers unescape on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Group(Grouping),
}

impl Payload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(raw) => Some(raw),
            Payload::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Grouping> {
        match self {
            Payload::Text(_) => None,
            Payload::Group(grouping) => Some(grouping),
        }
    }
}

/// An ordered sequence of elements, the `{ … }` production.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    pub elements: Vec<Element>,
}

impl Grouping {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Whether `name` matches the NAME production: `[A-Za-z_][A-Za-z0-9_.\-]*`.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != b'_' {
        return false;
    }
    bytes[1..]
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}
