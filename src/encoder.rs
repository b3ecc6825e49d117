//! JSON encoder
//!
//! Serializes a [`JsonValue`] tree to text, compact or pretty-printed.
//! Output stays readable by the decoder's minimal-escaping policy: only
//! `"` and `\` are escaped inside strings. `Invalid` cannot be encoded.

extern crate alloc;

use alloc::format;
use alloc::string::String;

use crate::error::EncodeError;
use crate::value::JsonValue;

/// Output layout for [`JsonEncoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeMode {
    /// No whitespace between tokens
    Compact,
    /// Newlines and two-space indentation
    Pretty,
}

/// Serializer for [`JsonValue`] trees.
///
/// # Example
/// ```
/// use parsekit::{JsonEncoder, JsonValue};
///
/// let text = JsonEncoder::compact().encode(&JsonValue::Boolean(true)).unwrap();
/// assert_eq!(text, "true");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct JsonEncoder {
    mode: EncodeMode,
}

impl JsonEncoder {
    /// Create an encoder with an explicit mode.
    pub fn new(mode: EncodeMode) -> Self {
        Self { mode }
    }

    /// Encoder producing compact output.
    pub fn compact() -> Self {
        Self::new(EncodeMode::Compact)
    }

    /// Encoder producing indented output.
    pub fn pretty() -> Self {
        Self::new(EncodeMode::Pretty)
    }

    /// Serialize a value tree.
    ///
    /// Fails with [`EncodeError::InvalidValue`] if the tree contains the
    /// `Invalid` sentinel anywhere.
    pub fn encode(&self, value: &JsonValue) -> Result<String, EncodeError> {
        let mut out = String::new();
        self.write_value(value, 0, &mut out)?;
        Ok(out)
    }

    fn write_value(
        &self,
        value: &JsonValue,
        depth: usize,
        out: &mut String,
    ) -> Result<(), EncodeError> {
        match value {
            JsonValue::Invalid => return Err(EncodeError::InvalidValue),
            JsonValue::Null => out.push_str("null"),
            JsonValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            JsonValue::Number(n) => {
                // f64 Display is the shortest round-trip form and never
                // scientific, so the decoder's number machine re-reads it;
                // non-finite values have no JSON form and degrade to null
                if n.is_finite() {
                    out.push_str(&format!("{}", n));
                } else {
                    out.push_str("null");
                }
            }
            JsonValue::String(s) => write_string(s, out),
            JsonValue::Array(items) => {
                if items.is_empty() {
                    out.push_str("[]");
                    return Ok(());
                }
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_break(depth + 1, out);
                    self.write_value(item, depth + 1, out)?;
                }
                self.write_break(depth, out);
                out.push(']');
            }
            JsonValue::Object(map) => {
                if map.is_empty() {
                    out.push_str("{}");
                    return Ok(());
                }
                out.push('{');
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_break(depth + 1, out);
                    write_string(key, out);
                    out.push(':');
                    if self.mode == EncodeMode::Pretty {
                        out.push(' ');
                    }
                    self.write_value(item, depth + 1, out)?;
                }
                self.write_break(depth, out);
                out.push('}');
            }
        }
        Ok(())
    }

    fn write_break(&self, depth: usize, out: &mut String) {
        if self.mode == EncodeMode::Pretty {
            out.push('\n');
            for _ in 0..depth {
                out.push_str("  ");
            }
        }
    }
}

/// Write a quoted string, escaping `"` and `\` so the decoder's
/// minimal-escaping policy reads it back unchanged.
fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
}
