// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::{
    error::MappingError,
    value::{parse_json_str, Map, Value},
};

pub fn encode(value: &Value) -> Result<String, MappingError> {
    let value = embed_json_leaves(value);
    let mut out = serde_json::to_string_pretty(&value)
        .map_err(|err| MappingError::InvalidFormat(format!("cannot encode JSON: {}", err)))?;
    out.push('\n');
    Ok(out)
}

/// True when `text` is a JSON object or array. Template authors sometimes
/// write raw JSON into a string leaf; such leaves are embedded, not re-escaped.
pub fn is_json_text(text: &str) -> bool {
    parse_embedded(text).is_some()
}

fn parse_embedded(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let container = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !container {
        return None;
    }
    parse_json_str(trimmed).ok()
}

fn embed_json_leaves(value: &Value) -> Value {
    match value {
        Value::String(text) => parse_embedded(text).unwrap_or_else(|| value.clone()),
        Value::Array(items) => Value::Array(items.iter().map(embed_json_leaves).collect()),
        Value::Map(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                out.insert(key.clone(), embed_json_leaves(child));
            }
            Value::Map(out)
        }
        _ => value.clone(),
    }
}
