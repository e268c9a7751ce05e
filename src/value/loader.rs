// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use saphyr::{Yaml, YamlLoader};

use crate::error::MappingError;

use super::{Map, Value};

pub fn parse_json_str(input: &str) -> Result<Value, MappingError> {
    serde_json::from_str(input).map_err(|err| MappingError::ParseError(format!("invalid JSON: {}", err)))
}

pub fn parse_yaml_str(input: &str) -> Result<Vec<Value>, MappingError> {
    let docs = YamlLoader::load_from_str(input).map_err(|err| MappingError::ParseError(format!("invalid YAML: {}", err)))?;
    docs.iter().map(convert_node).collect()
}

/// Splits a `---` delimited YAML header off the front of a Markdown document.
/// Returns the header (if any) and the remaining body.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = text.strip_prefix("---") else {
        return (None, text);
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(&['\r', '\n'][..]);
        if trimmed == "---" || trimmed == "..." {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(header), body);
        }
        offset += line.len();
    }

    (None, text)
}

fn convert_node(node: &Yaml) -> Result<Value, MappingError> {
    match node {
        Yaml::Null => Ok(Value::Null),
        Yaml::Boolean(value) => Ok(Value::Boolean(*value)),
        Yaml::Integer(value) => Ok(Value::Integer(*value)),
        Yaml::Real(text) => match node.as_f64() {
            Some(value) => Ok(Value::Real(value)),
            None => Err(MappingError::ParseError(format!("invalid YAML real '{}'", text))),
        },
        Yaml::String(value) => Ok(Value::String(value.clone())),
        Yaml::Array(items) => {
            let items = items.iter().map(convert_node).collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(items))
        }
        Yaml::Hash(hash) => {
            let mut map = Map::new();
            for (key, value) in hash {
                map.insert(convert_key(key)?, convert_node(value)?);
            }
            Ok(Value::Map(map))
        }
        Yaml::Alias(_) => Err(MappingError::ParseError("yaml aliases not supported".to_string())),
        _ => Err(MappingError::ParseError("unsupported yaml node".to_string())),
    }
}

fn convert_key(key: &Yaml) -> Result<String, MappingError> {
    match key {
        Yaml::String(value) | Yaml::Real(value) => Ok(value.clone()),
        Yaml::Integer(value) => Ok(value.to_string()),
        Yaml::Boolean(value) => Ok(value.to_string()),
        Yaml::Null => Ok("null".to_string()),
        _ => Err(MappingError::ParseError("map keys must be scalars".to_string())),
    }
}
