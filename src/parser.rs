// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod pattern;
mod placeholder;

#[cfg(test)]
mod tests;

use crate::{
    ast::{
        CompiledTemplate, MapEntryTemplate, MapTemplate, NodeTemplate, PlaceholderTemplate, ScalarTemplate,
        ScalarTemplateValue, SequenceTemplate, TemplateKind,
    },
    error::MappingError,
    value::Value,
};

pub use pattern::{PatternMatch, PlaceholderPattern};
pub use placeholder::{parse_placeholder, PlaceholderParser};

/// Compiles template values into placeholder trees for one delimiter pattern.
pub struct Parser {
    pattern: PlaceholderPattern,
    placeholder_parser: PlaceholderParser,
}

impl Parser {
    pub fn new(pattern: PlaceholderPattern) -> Parser {
        Parser {
            pattern,
            placeholder_parser: PlaceholderParser::new(),
        }
    }

    pub fn pattern(&self) -> PlaceholderPattern {
        self.pattern
    }

    pub fn parse(&self, template: &Value) -> Result<CompiledTemplate, MappingError> {
        let node = self.parse_node(template)?;
        Ok(CompiledTemplate {
            kind: TemplateKind::Structured,
            node,
        })
    }

    pub fn parse_text(&self, template: &str) -> Result<CompiledTemplate, MappingError> {
        let scalar = self.parse_scalar(template)?;
        Ok(CompiledTemplate {
            kind: TemplateKind::Text,
            node: NodeTemplate::Scalar(scalar),
        })
    }

    pub fn parse_node(&self, value: &Value) -> Result<NodeTemplate, MappingError> {
        match value {
            Value::Array(items) => {
                let sequence = self.parse_sequence(items)?;
                Ok(NodeTemplate::Sequence(sequence))
            }
            Value::Map(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let value = self.parse_node(value)?;
                    entries.push(MapEntryTemplate {
                        key: key.clone(),
                        value,
                    });
                }
                let has_placeholders = entries.iter().any(|entry| entry.value.has_placeholders());
                Ok(NodeTemplate::Map(MapTemplate {
                    entries,
                    has_placeholders,
                }))
            }
            Value::String(string) => {
                let scalar = self.parse_scalar(string)?;
                if scalar.has_placeholders() {
                    Ok(NodeTemplate::Scalar(scalar))
                } else {
                    Ok(NodeTemplate::Literal(value.clone()))
                }
            }
            Value::Null | Value::Boolean(_) | Value::Integer(_) | Value::Real(_) => Ok(NodeTemplate::Literal(value.clone())),
        }
    }

    fn parse_sequence(&self, items: &[Value]) -> Result<SequenceTemplate, MappingError> {
        let values = items
            .iter()
            .map(|item| self.parse_node(item))
            .collect::<Result<Vec<_>, _>>()?;
        let has_placeholders = values.iter().any(NodeTemplate::has_placeholders);
        Ok(SequenceTemplate {
            values,
            has_placeholders,
        })
    }

    fn parse_scalar(&self, value: &str) -> Result<ScalarTemplate, MappingError> {
        let mut curr_index = 0;
        let mut values = Vec::new();
        loop {
            // Find next placeholder.
            let Some(found) = self.pattern.find(value, curr_index) else {
                break;
            };

            // Add non-placeholder string characters.
            if found.start > curr_index {
                let non_template_str = value[curr_index..found.start].to_string();
                values.push(ScalarTemplateValue::String(non_template_str));
            }

            // Add placeholder.
            let placeholder = self.placeholder_parser.parse(found.content)?;
            values.push(ScalarTemplateValue::Placeholder(PlaceholderTemplate {
                raw: value[found.start..found.end].to_string(),
                placeholder,
            }));

            curr_index = found.end;
        }

        // Add non-placeholder string characters.
        if value.len() > curr_index || values.is_empty() {
            let non_template_str = value[curr_index..].to_string();
            values.push(ScalarTemplateValue::String(non_template_str));
        }

        Ok(ScalarTemplate { values })
    }
}
