// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::{
    error::MappingError,
    value::{Map, Value},
};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ROOT_TAG: &str = "root";
// Element name for the items of a top-level list, which has no key to repeat.
const ITEM_TAG: &str = "item";

pub fn encode(value: &Value) -> Result<String, MappingError> {
    let mut lines = vec![DECLARATION.to_string()];
    match value {
        Value::Map(map) if !map.is_empty() => {
            lines.push(format!("<{}>", ROOT_TAG));
            write_entries(&mut lines, map, 1)?;
            lines.push(format!("</{}>", ROOT_TAG));
        }
        Value::Array(items) if !items.is_empty() => {
            lines.push(format!("<{}>", ROOT_TAG));
            for item in items {
                write_element(&mut lines, ITEM_TAG, item, 1)?;
            }
            lines.push(format!("</{}>", ROOT_TAG));
        }
        _ => write_element(&mut lines, ROOT_TAG, value, 0)?,
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

fn write_entries(lines: &mut Vec<String>, map: &Map, depth: usize) -> Result<(), MappingError> {
    for (key, value) in map {
        check_name(key)?;
        write_element(lines, key, value, depth)?;
    }
    Ok(())
}

fn write_element(lines: &mut Vec<String>, name: &str, value: &Value, depth: usize) -> Result<(), MappingError> {
    let indent = "  ".repeat(depth);
    match value {
        // A list repeats its parent element once per item; an empty list emits nothing.
        Value::Array(items) => {
            for item in items {
                write_element(lines, name, item, depth)?;
            }
        }
        Value::Map(map) if !map.is_empty() => {
            lines.push(format!("{}<{}>", indent, name));
            write_entries(lines, map, depth + 1)?;
            lines.push(format!("{}</{}>", indent, name));
        }
        Value::Map(_) | Value::Null => lines.push(format!("{}<{}/>", indent, name)),
        scalar => lines.push(format!(
            "{}<{}>{}</{}>",
            indent,
            name,
            escape_xml(&scalar.to_display_string()),
            name
        )),
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), MappingError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        }
        None => false,
    };
    if !valid {
        return Err(MappingError::InvalidFormat(format!(
            "'{}' is not a valid XML element name",
            name
        )));
    }
    Ok(())
}

fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
