//! CBOR diagnostic notation (RFC 8949 §8) for test vectors and logs.

use ciborium::value::Value;
use std::fmt::Write;

/// Render a value in diagnostic notation, e.g. `{61285: {1: h'd15c…'}}`.
pub fn diagnostic(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Integer(i) => {
            let _ = write!(out, "{}", i128::from(*i));
        }
        Value::Bytes(b) => {
            let _ = write!(out, "h'{}'", hex::encode(b));
        }
        // Text uses JSON string escapes.
        Value::Text(s) => match serde_json::to_string(s) {
            Ok(quoted) => out.push_str(&quoted),
            Err(_) => out.push_str("\"\""),
        },
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Map(entries) => {
            out.push('{');
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, k);
                out.push_str(": ");
                write_value(out, v);
            }
            out.push('}');
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
        Value::Float(f) => {
            let _ = write!(out, "{f:?}");
        }
        Value::Tag(tag, inner) => {
            let _ = write!(out, "{tag}(");
            write_value(out, inner);
            out.push(')');
        }
        _ => out.push_str("undefined"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, uint};

    #[test]
    fn test_witness_diagnostic() {
        let value = decode(&[0xa1, 0x19, 0xef, 0x65, 0xa1, 0x01, 0x42, 0xd1, 0x5c]).unwrap();
        assert_eq!(diagnostic(&value), "{61285: {1: h'd15c'}}");
    }

    #[test]
    fn test_nested_diagnostic() {
        let value = Value::Array(vec![
            Value::Array(vec![Value::Bytes(vec![0xab]), uint(1)]),
            Value::Text("purpose".into()),
            Value::Null,
        ]);
        assert_eq!(diagnostic(&value), "[[h'ab', 1], \"purpose\", null]");
    }

    #[test]
    fn test_text_uses_json_escapes() {
        let value = Value::Text("a\"b\\c\u{1f}\n".into());
        assert_eq!(diagnostic(&value), r#""a\"b\\c\u001f\n""#);
    }
}
