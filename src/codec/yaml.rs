// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::value::{format_real, parse_yaml_str, Map, Value};

const INDENT: usize = 2;

pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    if is_block(value) {
        write_block(&mut out, value, 0);
    } else {
        out.push_str(&scalar(value));
        out.push('\n');
    }
    out
}

// Non-empty containers take their own lines; everything else fits after a key.
fn is_block(value: &Value) -> bool {
    match value {
        Value::Map(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn write_block(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Map(map) => write_map(out, map, indent),
        Value::Array(items) => write_seq(out, items, indent),
        _ => {}
    }
}

fn write_map(out: &mut String, map: &Map, indent: usize) {
    for (key, value) in map {
        push_indent(out, indent);
        out.push_str(&quote(key));
        out.push(':');
        if is_block(value) {
            out.push('\n');
            write_block(out, value, indent + INDENT);
        } else {
            out.push(' ');
            out.push_str(&scalar(value));
            out.push('\n');
        }
    }
}

fn write_seq(out: &mut String, items: &[Value], indent: usize) {
    for item in items {
        push_indent(out, indent);
        out.push_str("- ");
        if is_block(item) {
            // Render one level deeper, then pull the first line up beside the dash.
            let mut nested = String::new();
            write_block(&mut nested, item, indent + INDENT);
            out.push_str(&nested[indent + INDENT..]);
        } else {
            out.push_str(&scalar(item));
            out.push('\n');
        }
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push(' ');
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(value) => value.to_string(),
        Value::Integer(value) => value.to_string(),
        Value::Real(value) => format_real(*value),
        Value::String(value) => quote(value),
        Value::Array(_) => "[]".to_string(),
        Value::Map(_) => "{}".to_string(),
    }
}

fn quote(text: &str) -> String {
    if !needs_quotes(text) {
        return text.to_string();
    }

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

fn needs_quotes(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return true;
    };
    if text.contains(&[':', '#', '"', '\n', '\r', '\t'][..]) {
        return true;
    }
    if first.is_whitespace() || text.ends_with(char::is_whitespace) {
        return true;
    }
    if "-?[]{},&*!|>'%@`".contains(first) {
        return true;
    }

    // YAML 1.1 readers still treat these as booleans.
    let lower = text.to_ascii_lowercase();
    if matches!(lower.as_str(), "yes" | "no" | "on" | "off" | "y" | "n") {
        return true;
    }

    // Plain text must read back as the same string.
    !matches!(parse_yaml_str(text).as_deref(), Ok([Value::String(plain)]) if plain == text)
}
