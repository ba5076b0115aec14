//! Key casing between the local API surface and the wire format
//!
//! Locally every key is snake_case (`created_time`); the API speaks
//! camelCase (`createdTime`). Keys are rewritten recursively through objects
//! and arrays, except below a `fields` key: field names belong to the user's
//! table schema and are copied verbatim in both directions.

use serde_json::{Map, Value};

use crate::error::Result;

/// Key whose value is never reshaped
pub const FIELDS_KEY: &str = "fields";

/// Rewrite keys to camelCase and drop nulls, producing a wire value.
///
/// Nulls are dropped from every object the codec walks into. Values under
/// `fields` are copied as-is, so a null there still reaches the server and
/// clears the cell.
pub fn encode(value: &Value) -> Value {
    transform(value, from_snake, true)
}

/// Serialize a value for the request body
pub fn encode_body(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&encode(value))?)
}

/// Rewrite keys of a parsed response to snake_case
pub fn decode(value: &Value) -> Value {
    transform(value, to_snake, false)
}

/// Parse a response body and decode it. An empty body decodes to `null`.
pub fn decode_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    let parsed: Value = serde_json::from_str(body)?;
    Ok(decode(&parsed))
}

fn transform(value: &Value, rename: fn(&str) -> String, skip_nulls: bool) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                if skip_nulls && inner.is_null() {
                    continue;
                }
                let inner = if key == FIELDS_KEY {
                    inner.clone()
                } else {
                    transform(inner, rename, skip_nulls)
                };
                out.insert(rename(key), inner);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| transform(item, rename, skip_nulls))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// `created_time` -> `createdTime`
///
/// Each underscore is removed and the character after it uppercased. A
/// trailing underscore is kept.
pub fn from_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_'
            && let Some(next) = chars.next()
        {
            out.extend(next.to_uppercase());
            continue;
        }
        out.push(c);
    }
    out
}

/// `createdTime` -> `created_time`
///
/// Every uppercase letter is prefixed with an underscore, then the whole key
/// is lowercased.
pub fn to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c);
    }
    out.to_lowercase()
}
