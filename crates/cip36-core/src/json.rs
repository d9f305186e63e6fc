//! JSON form of metadata values.
//!
//! Uses the Cardano "no schema" metadata convention: byte strings are
//! `"0x…"` hex strings, map keys that are decimal numbers are integer keys,
//! and JSON numbers must be integers.
//!
//! ```json
//! {"61286": {"1": "0x57758911…", "2": 74565}}
//! ```

use ciborium::value::{Integer, Value};
use serde_json::{Map, Number, Value as Json};

use crate::error::DecodeError;

/// Convert a JSON document to a structured metadata value.
pub fn value_from_json(json: &Json) -> Result<Value, DecodeError> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => number(n),
        Json::String(s) => string(s),
        Json::Array(items) => items
            .iter()
            .map(value_from_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Json::Object(map) => map
            .iter()
            .map(|(k, v)| Ok((key(k), value_from_json(v)?)))
            .collect::<Result<Vec<_>, DecodeError>>()
            .map(Value::Map),
    }
}

/// Parse a JSON string and convert it.
pub fn value_from_json_str(s: &str) -> Result<Value, DecodeError> {
    let json: Json = serde_json::from_str(s).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    value_from_json(&json)
}

/// Render a structured value as JSON.
///
/// Non-text, non-integer map keys are rendered in diagnostic notation.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Integer(i) => integer_to_json(*i),
        Value::Bytes(b) => Json::String(format!("0x{}", hex::encode(b))),
        Value::Text(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(entries) => {
            let mut map = Map::new();
            for (k, v) in entries {
                let key = match k {
                    Value::Integer(i) => i128::from(*i).to_string(),
                    Value::Text(s) => s.clone(),
                    other => crate::diag::diagnostic(other),
                };
                map.insert(key, value_to_json(v));
            }
            Json::Object(map)
        }
        Value::Bool(b) => Json::Bool(*b),
        _ => Json::Null,
    }
}

fn number(n: &Number) -> Result<Value, DecodeError> {
    if let Some(u) = n.as_u64() {
        Ok(Value::Integer(Integer::from(u)))
    } else if let Some(i) = n.as_i64() {
        Ok(Value::Integer(Integer::from(i)))
    } else {
        Err(DecodeError::InvalidJson(format!("non-integer number {n}")))
    }
}

fn string(s: &str) -> Result<Value, DecodeError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => hex::decode(digits)
            .map(Value::Bytes)
            .map_err(|e| DecodeError::InvalidHex(format!("{s}: {e}"))),
        None => Ok(Value::Text(s.to_string())),
    }
}

/// Decimal keys in canonical form become integers; anything else stays text.
fn key(k: &str) -> Value {
    match k.parse::<u64>() {
        Ok(n) if n.to_string() == k => Value::Integer(Integer::from(n)),
        _ => Value::Text(k.to_string()),
    }
}

fn integer_to_json(i: Integer) -> Json {
    let n = i128::from(i);
    if let Ok(u) = u64::try_from(n) {
        Json::from(u)
    } else if let Ok(s) = i64::try_from(n) {
        Json::from(s)
    } else {
        Json::String(n.to_string())
    }
}
