//! SISL string escapes.
//!
//! The escape vocabulary is byte-oriented: `escape` maps arbitrary bytes to
//! printable ASCII and `unescape` maps the escaped form back to the exact
//! input bytes. Multi-byte UTF-8 sequences are carried as `\x` pairs, never
//! re-encoded as `\u`.

use crate::error::Error;
use crate::Result;

const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

/// Escape raw bytes into the SISL string-literal form.
///
/// # Examples
/// ```
/// assert_eq!(sisl::escape(b"a\nb"), "a\\nb");
/// assert_eq!(sisl::escape(&[0x07]), "\\x07");
/// ```
pub fn escape(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());
    for &byte in input {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            0x20..=0x7E => out.push(byte as char),
            _ => {
                out.push('\\');
                out.push('x');
                out.push(HEX_LOWER[(byte >> 4) as usize] as char);
                out.push(HEX_LOWER[(byte & 0x0F) as usize] as char);
            }
        }
    }
    out
}

/// Decode an escaped SISL string literal into raw bytes.
pub fn unescape(input: &str) -> Result<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'\\' && pos + 1 < bytes.len() {
            pos += 1;
            let selector = bytes[pos];
            pos += 1;

            match selector {
                b'"' => out.push(b'"'),
                b'\\' => out.push(b'\\'),
                b'r' => out.push(b'\r'),
                b't' => out.push(b'\t'),
                b'n' => out.push(b'\n'),
                b'x' => {
                    let value = parse_hex(bytes, &mut pos, 2)?;
                    out.push(value as u8);
                }
                b'u' => {
                    let value = parse_hex(bytes, &mut pos, 4)?;
                    push_codepoint(&mut out, value)?;
                }
                b'U' => {
                    let value = parse_hex(bytes, &mut pos, 8)?;
                    push_codepoint(&mut out, value)?;
                }
                other => {
                    return Err(Error::escape(format!(
                        "Invalid escape sequence: \\{}",
                        other as char
                    )));
                }
            }
        } else {
            out.push(bytes[pos]);
            pos += 1;
        }
    }

    Ok(out)
}

/// Decode an escaped SISL string literal into a Unicode string.
///
/// `\x` escapes can produce byte sequences that are not valid UTF-8; those
/// are rejected here rather than replaced, so that any string this function
/// accepts survives a full encode/decode round trip.
pub fn unescape_to_string(input: &str) -> Result<String> {
    let bytes = unescape(input)?;
    String::from_utf8(bytes)
        .map_err(|_| Error::escape("Escape sequence produced invalid UTF-8"))
}

fn parse_hex(bytes: &[u8], pos: &mut usize, count: usize) -> Result<u32> {
    let mut value: u32 = 0;
    for _ in 0..count {
        let digit = bytes
            .get(*pos)
            .and_then(|&b| hex_value(b))
            .ok_or_else(|| Error::escape("Invalid hex escape sequence"))?;
        value = (value << 4) | digit;
        *pos += 1;
    }
    Ok(value)
}

fn hex_value(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some(u32::from(byte - b'0')),
        b'a'..=b'f' => Some(u32::from(byte - b'a') + 10),
        b'A'..=b'F' => Some(u32::from(byte - b'A') + 10),
        _ => None,
    }
}

fn push_codepoint(out: &mut Vec<u8>, cp: u32) -> Result<()> {
    if (0xD800..=0xDFFF).contains(&cp) {
        return Err(Error::escape(format!(
            "Escape sequence encodes a surrogate code point: U+{cp:04X}"
        )));
    }
    let ch = char::from_u32(cp)
        .ok_or_else(|| Error::escape(format!("Invalid Unicode code point: U+{cp:X}")))?;
    let mut buf = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    Ok(())
}
