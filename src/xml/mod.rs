//! XML mirror codec.
//!
//! Two representations share one entry point pair:
//!
//! - **Typed mode** mirrors the SISL type system: a `<root>` element whose
//!   children carry a `type` attribute (`null`, `bool`, `int`, `float`,
//!   `str`, `obj`, `list`), with list items spelled `<item>`.
//! - **Generic mode** round-trips arbitrary XML through a JSON shape built
//!   from `_root`/`_tag`/`_attrs`/`_children`/`_text`, plus `_decl` for the
//!   document declaration.
//!
//! `value_to_xml` routes by the presence of a top-level `_root` key;
//! `xml_to_value` routes by whether the document looks like the typed
//! format (`<root>` whose element children carry `type` attributes).

use serde_json::{Map, Number, Value};

use crate::decode::value::{parse_float, parse_int};
use crate::error::Error;
use crate::types::is_valid_name;
use crate::Result;

const TYPED_INDENT: &str = "  ";
const GENERIC_INDENT: &str = "\t";

/// Encode a JSON object as XML. Values containing a `_root` key use the
/// generic representation; everything else uses the typed one.
pub fn value_to_xml(value: &Value) -> Result<String> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::xml("Top-level value must be a JSON object"))?;

    if object.contains_key("_root") {
        return generic_to_xml(object);
    }

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    if object.is_empty() {
        out.push_str("<root/>\n");
        return Ok(out);
    }

    out.push_str("<root>\n");
    for (key, child) in object {
        write_typed_element(&mut out, key, child, 1)?;
    }
    out.push_str("</root>\n");
    Ok(out)
}

/// Decode an XML document produced by either mode back into a JSON value.
pub fn xml_to_value(input: &str) -> Result<Value> {
    let doc = roxmltree::Document::parse(input)
        .map_err(|err| Error::xml(format!("XML parse error: {err}")))?;
    let root = doc.root_element();

    if is_typed_document(&root) {
        let mut object = Map::new();
        for child in root.children().filter(|n| n.is_element()) {
            object.insert(
                child.tag_name().name().to_string(),
                decode_typed_element(&child)?,
            );
        }
        return Ok(Value::Object(object));
    }

    let mut object = Map::new();
    if let Some(decl) = parse_declaration(input) {
        object.insert("_decl".to_string(), Value::Object(decl));
    }
    object.insert("_root".to_string(), parse_generic_element(&root));
    Ok(Value::Object(object))
}

// --- typed mode ---

fn is_typed_document(root: &roxmltree::Node<'_, '_>) -> bool {
    if root.tag_name().name() != "root" {
        return false;
    }
    match root.children().find(|n| n.is_element()) {
        Some(first) => first.attribute("type").is_some(),
        // An empty <root> reads as typed.
        None => true,
    }
}

fn write_typed_element(
    out: &mut String,
    name: &str,
    value: &Value,
    depth: usize,
) -> Result<()> {
    if !is_valid_name(name) {
        return Err(Error::xml(format!("Invalid XML element name: {name}")));
    }

    push_indent(out, TYPED_INDENT, depth);
    match value {
        Value::Object(object) => {
            if object.is_empty() {
                out.push_str(&format!("<{name} type=\"obj\"/>\n"));
            } else {
                out.push_str(&format!("<{name} type=\"obj\">\n"));
                for (key, child) in object {
                    write_typed_element(out, key, child, depth + 1)?;
                }
                push_indent(out, TYPED_INDENT, depth);
                out.push_str(&format!("</{name}>\n"));
            }
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str(&format!("<{name} type=\"list\"/>\n"));
            } else {
                out.push_str(&format!("<{name} type=\"list\">\n"));
                for item in items {
                    write_typed_element(out, "item", item, depth + 1)?;
                }
                push_indent(out, TYPED_INDENT, depth);
                out.push_str(&format!("</{name}>\n"));
            }
        }
        Value::Null => out.push_str(&format!("<{name} type=\"null\"/>\n")),
        scalar => {
            let (type_name, text) = scalar_text(scalar)?;
            if text.is_empty() {
                out.push_str(&format!("<{name} type=\"{type_name}\"/>\n"));
            } else {
                out.push_str(&format!(
                    "<{name} type=\"{type_name}\">{}</{name}>\n",
                    escape_text(&text)
                ));
            }
        }
    }
    Ok(())
}

/// Canonical text for a scalar: the same integer/float forms the SISL
/// encoder uses, without the quoting.
fn scalar_text(value: &Value) -> Result<(&'static str, String)> {
    match value {
        Value::Bool(b) => Ok(("bool", b.to_string())),
        Value::Number(number) => number_text(number),
        Value::String(text) => Ok(("str", text.clone())),
        _ => Err(Error::xml("Expected a scalar value")),
    }
}

fn number_text(number: &Number) -> Result<(&'static str, String)> {
    if let Some(i) = number.as_i64() {
        let mut buf = itoa::Buffer::new();
        return Ok(("int", buf.format(i).to_string()));
    }
    if number.is_u64() {
        return Err(Error::xml(format!(
            "Integer out of range for a signed 64-bit payload: {number}"
        )));
    }
    let f = number
        .as_f64()
        .ok_or_else(|| Error::xml(format!("Unrepresentable number: {number}")))?;
    let mut buf = ryu::Buffer::new();
    let literal = buf.format_finite(f);
    let mut text = literal.to_string();
    if !literal.contains(['.', 'e', 'E']) {
        text.push_str(".0");
    }
    Ok(("float", text))
}

fn decode_typed_element(node: &roxmltree::Node<'_, '_>) -> Result<Value> {
    let type_name = node.attribute("type").ok_or_else(|| {
        Error::xml(format!(
            "Missing type attribute on element: {}",
            node.tag_name().name()
        ))
    })?;

    let text = node.text().unwrap_or("");

    match type_name {
        "null" => Ok(Value::Null),
        "bool" => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::xml(format!(
                "Bool value must be 'true' or 'false', got: {text}"
            ))),
        },
        "int" => parse_int(text)
            .map(|i| Value::Number(Number::from(i)))
            .map_err(|_| Error::xml(format!("Invalid integer value: {text}"))),
        "float" => {
            let f = parse_float(text)
                .map_err(|_| Error::xml(format!("Invalid float value: {text}")))?;
            Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| Error::xml(format!("Invalid float value: {text}")))
        }
        "str" => Ok(Value::String(text.to_string())),
        "list" => {
            let mut items = Vec::new();
            for child in node.children().filter(|n| n.is_element()) {
                items.push(decode_typed_element(&child)?);
            }
            Ok(Value::Array(items))
        }
        "obj" => {
            let mut object = Map::new();
            for child in node.children().filter(|n| n.is_element()) {
                object.insert(
                    child.tag_name().name().to_string(),
                    decode_typed_element(&child)?,
                );
            }
            Ok(Value::Object(object))
        }
        other => Err(Error::xml(format!("Unknown type: {other}"))),
    }
}

// --- generic mode ---

fn generic_to_xml(object: &Map<String, Value>) -> Result<String> {
    let mut out = String::new();

    if let Some(decl) = object.get("_decl") {
        let decl = decl
            .as_object()
            .ok_or_else(|| Error::xml("_decl must be an object of strings"))?;
        out.push_str("<?xml");
        for (key, value) in decl {
            let text = value
                .as_str()
                .ok_or_else(|| Error::xml("_decl attributes must be strings"))?;
            out.push_str(&format!(" {key}=\"{}\"", escape_attribute(text)));
        }
        out.push_str("?>\n");
    }

    let root = object
        .get("_root")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::xml("_root must be an object"))?;
    write_generic_element(&mut out, root, 0)?;
    Ok(out)
}

fn write_generic_element(
    out: &mut String,
    element: &Map<String, Value>,
    depth: usize,
) -> Result<()> {
    let tag = element
        .get("_tag")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::xml("Generic element requires a string _tag"))?;

    push_indent(out, GENERIC_INDENT, depth);
    out.push('<');
    out.push_str(tag);

    if let Some(attrs) = element.get("_attrs") {
        let attrs = attrs
            .as_object()
            .ok_or_else(|| Error::xml("_attrs must be an object of strings"))?;
        for (key, value) in attrs {
            let text = value
                .as_str()
                .ok_or_else(|| Error::xml("_attrs values must be strings"))?;
            out.push_str(&format!(" {key}=\"{}\"", escape_attribute(text)));
        }
    }

    if let Some(children) = element.get("_children") {
        let children = children
            .as_array()
            .ok_or_else(|| Error::xml("_children must be an array"))?;
        out.push_str(">\n");
        for child in children {
            let child = child
                .as_object()
                .ok_or_else(|| Error::xml("_children entries must be objects"))?;
            write_generic_element(out, child, depth + 1)?;
        }
        push_indent(out, GENERIC_INDENT, depth);
        out.push_str(&format!("</{tag}>\n"));
    } else if let Some(text) = element.get("_text") {
        let text = text
            .as_str()
            .ok_or_else(|| Error::xml("_text must be a string"))?;
        out.push('>');
        out.push_str(&escape_text(text));
        out.push_str(&format!("</{tag}>\n"));
    } else {
        out.push_str("/>\n");
    }
    Ok(())
}

fn parse_generic_element(node: &roxmltree::Node<'_, '_>) -> Value {
    let mut element = Map::new();
    element.insert(
        "_tag".to_string(),
        Value::String(node.tag_name().name().to_string()),
    );

    if node.attributes().next().is_some() {
        let mut attrs = Map::new();
        for attr in node.attributes() {
            attrs.insert(
                attr.name().to_string(),
                Value::String(attr.value().to_string()),
            );
        }
        element.insert("_attrs".to_string(), Value::Object(attrs));
    }

    let child_elements: Vec<_> = node.children().filter(|n| n.is_element()).collect();
    if !child_elements.is_empty() {
        let children = child_elements
            .iter()
            .map(parse_generic_element)
            .collect::<Vec<_>>();
        element.insert("_children".to_string(), Value::Array(children));
    } else if let Some(text) = node.text().filter(|t| !t.is_empty()) {
        element.insert("_text".to_string(), Value::String(text.to_string()));
    }

    Value::Object(element)
}

/// roxmltree skips the XML declaration, so its attributes are recovered
/// with a small scan of the document prefix.
fn parse_declaration(input: &str) -> Option<Map<String, Value>> {
    let trimmed = input.trim_start();
    let rest = trimmed.strip_prefix("<?xml")?;
    let end = rest.find("?>")?;
    let body = &rest[..end];

    let mut attrs = Map::new();
    let mut chars = body.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }
        let mut name_end = start + ch.len_utf8();
        while let Some(&(idx, c)) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            name_end = idx + c.len_utf8();
            chars.next();
        }
        let name = &body[start..name_end];

        while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            chars.next();
        }
        let Some(&(_, '=')) = chars.peek() else {
            return None;
        };
        chars.next();
        while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            chars.next();
        }
        let Some((_, quote)) = chars.next() else {
            return None;
        };
        if quote != '"' && quote != '\'' {
            return None;
        }
        let mut value = String::new();
        loop {
            let (_, c) = chars.next()?;
            if c == quote {
                break;
            }
            value.push(c);
        }
        attrs.insert(name.to_string(), Value::String(value));
    }

    Some(attrs)
}

// --- shared helpers ---

fn push_indent(out: &mut String, unit: &str, depth: usize) {
    for _ in 0..depth {
        out.push_str(unit);
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
