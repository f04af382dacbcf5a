use serde_json::{Map, Number, Value};

use crate::error::Error;
use crate::text::escape;
use crate::types::is_valid_name;
use crate::Result;

/// Canonical SISL writer. Output is byte-deterministic: entries are
/// separated by exactly `", "`, every scalar payload is double-quoted, and
/// numbers use their shortest round-trip form.
pub(crate) struct Writer {
    buffer: String,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn write_document(&mut self, object: &Map<String, Value>) -> Result<()> {
        self.buffer.push('{');
        let mut first = true;
        for (key, value) in object {
            if !first {
                self.buffer.push_str(", ");
            }
            first = false;
            self.write_entry(key, value)?;
        }
        self.buffer.push('}');
        Ok(())
    }

    fn write_entry(&mut self, name: &str, value: &Value) -> Result<()> {
        if !is_valid_name(name) {
            return Err(Error::codec(format!("Invalid object key: '{name}'")));
        }
        self.buffer.push_str(name);
        self.buffer.push_str(": ");
        self.write_typed_value(value)
    }

    fn write_typed_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.buffer.push_str("!null \"\""),
            Value::Bool(true) => self.buffer.push_str("!bool \"true\""),
            Value::Bool(false) => self.buffer.push_str("!bool \"false\""),
            Value::Number(number) => self.write_number(number)?,
            Value::String(text) => {
                self.buffer.push_str("!str \"");
                self.buffer.push_str(&escape(text.as_bytes()));
                self.buffer.push('"');
            }
            Value::Array(items) => {
                self.buffer.push_str("!list {");
                let mut index = itoa::Buffer::new();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.buffer.push_str(", ");
                    }
                    self.buffer.push('_');
                    self.buffer.push_str(index.format(i));
                    self.buffer.push_str(": ");
                    self.write_typed_value(item)?;
                }
                self.buffer.push('}');
            }
            Value::Object(object) => {
                self.buffer.push_str("!obj ");
                self.write_document(object)?;
            }
        }
        Ok(())
    }

    /// Integers become `!int` with plain decimal digits; everything else is
    /// `!float` in ryu's shortest form, with `.0` appended when the literal
    /// would otherwise read back as an integer.
    fn write_number(&mut self, number: &Number) -> Result<()> {
        if let Some(i) = number.as_i64() {
            self.buffer.push_str("!int \"");
            let mut buf = itoa::Buffer::new();
            self.buffer.push_str(buf.format(i));
            self.buffer.push('"');
            return Ok(());
        }
        if number.is_u64() {
            return Err(Error::codec(format!(
                "Integer out of range for a signed 64-bit payload: {number}"
            )));
        }
        let f = number
            .as_f64()
            .ok_or_else(|| Error::codec(format!("Unrepresentable number: {number}")))?;

        self.buffer.push_str("!float \"");
        let mut buf = ryu::Buffer::new();
        let literal = buf.format_finite(f);
        self.buffer.push_str(literal);
        if !literal.contains(['.', 'e', 'E']) {
            self.buffer.push_str(".0");
        }
        self.buffer.push('"');
        Ok(())
    }
}
