// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// JSON-like value shared by data, schemas and templates.

mod loader;
mod serde_impl;

#[cfg(test)]
mod tests;

use hashlink::LinkedHashMap;

pub use loader::{parse_json_str, parse_yaml_str, split_front_matter};

pub type Map = LinkedHashMap<String, Value>;

#[derive(Clone, PartialEq, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    // Numbers that don't fit in an i64 (e.g. floating point).
    Real(f64),
    String(String),
    Array(Vec<Value>),
    Map(Map),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Real(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Conditional truthiness: `null`, `false` and the empty string are false,
    /// everything else is true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false)) && self.as_str() != Some("")
    }

    /// Text used when a value is interpolated into a larger string or an XML
    /// text node. Containers render as compact JSON.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(value) => value.to_string(),
            Value::Integer(value) => value.to_string(),
            Value::Real(value) => format_real(*value),
            Value::String(value) => value.clone(),
            Value::Array(_) | Value::Map(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// Sets `value` at a dotted path, creating intermediate maps as needed.
    /// Returns false when the path crosses a non-map value.
    pub fn set_path(&mut self, path: &str, value: Value) -> bool {
        let mut segments = path.split('.').peekable();
        let mut current = self;
        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return false;
            }
            if current.is_null() {
                *current = Value::Map(Map::new());
            }
            let Value::Map(map) = current else {
                return false;
            };
            if segments.peek().is_none() {
                map.insert(segment.to_string(), value);
                return true;
            }
            current = map.entry(segment.to_string()).or_insert(Value::Null);
        }
        false
    }
}

/// Formats a real so that it always reads back as a real.
pub fn format_real(value: f64) -> String {
    if value.is_nan() {
        return ".nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { ".inf" } else { "-.inf" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}
