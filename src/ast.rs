// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::value::{Map, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct CompiledTemplate {
    pub kind: TemplateKind,
    pub node: NodeTemplate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateKind {
    // JSON-like skeleton; output shape follows the template.
    Structured,
    // Raw text with inline placeholders; output is the resolved text.
    Text,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeTemplate {
    Sequence(SequenceTemplate),
    Map(MapTemplate),
    Scalar(ScalarTemplate),
    Literal(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SequenceTemplate {
    pub values: Vec<NodeTemplate>,
    pub has_placeholders: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapTemplate {
    pub entries: Vec<MapEntryTemplate>,
    pub has_placeholders: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapEntryTemplate {
    pub key: String,
    pub value: NodeTemplate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarTemplate {
    pub values: Vec<ScalarTemplateValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarTemplateValue {
    String(String),
    Placeholder(PlaceholderTemplate),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaceholderTemplate {
    // Placeholder text as written, delimiters included.
    pub raw: String,
    pub placeholder: Placeholder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placeholder {
    Literal(String),
    SimpleVariable { name: String, default: Option<String> },
    PathVariable { path: String, default: Option<String> },
    Conditional { condition: String, when_true: String, when_false: String },
    ArrayExpansion,
    FileReference { path: String },
}

impl Placeholder {
    /// Name reported in resolved/missing lists.
    pub fn name(&self) -> String {
        match self {
            Placeholder::Literal(text) => text.clone(),
            Placeholder::SimpleVariable { name, .. } => name.clone(),
            Placeholder::PathVariable { path, .. } => path.clone(),
            Placeholder::Conditional { condition, .. } => condition.clone(),
            Placeholder::ArrayExpansion => "@items".to_string(),
            Placeholder::FileReference { path } => format!("@file:{}", path),
        }
    }

    pub fn default(&self) -> Option<&str> {
        match self {
            Placeholder::SimpleVariable { default, .. } | Placeholder::PathVariable { default, .. } => {
                default.as_deref()
            }
            _ => None,
        }
    }

    /// Data path this placeholder reads, if any.
    pub fn data_path(&self) -> Option<&str> {
        match self {
            Placeholder::SimpleVariable { name, .. } => Some(name),
            Placeholder::PathVariable { path, .. } => Some(path),
            Placeholder::Conditional { condition, .. } => Some(condition),
            _ => None,
        }
    }
}

impl NodeTemplate {
    pub fn has_placeholders(&self) -> bool {
        match self {
            NodeTemplate::Sequence(seq_templ) => seq_templ.has_placeholders,
            NodeTemplate::Map(map_templ) => map_templ.has_placeholders,
            NodeTemplate::Scalar(scalar_templ) => scalar_templ.has_placeholders(),
            NodeTemplate::Literal(_) => false,
        }
    }

    /// Rebuilds the template value as written, placeholders left in place.
    pub fn to_value(&self) -> Value {
        match self {
            NodeTemplate::Sequence(seq_templ) => {
                Value::Array(seq_templ.values.iter().map(NodeTemplate::to_value).collect())
            }
            NodeTemplate::Map(map_templ) => {
                let mut map = Map::new();
                for entry in &map_templ.entries {
                    map.insert(entry.key.clone(), entry.value.to_value());
                }
                Value::Map(map)
            }
            NodeTemplate::Scalar(scalar_templ) => Value::String(scalar_templ.source_text()),
            NodeTemplate::Literal(value) => value.clone(),
        }
    }
}

impl ScalarTemplate {
    /// Literal placeholders (`{{}}` and the like) read no data and don't count.
    pub fn has_placeholders(&self) -> bool {
        self.placeholders()
            .any(|placeholder_templ| !matches!(placeholder_templ.placeholder, Placeholder::Literal(_)))
    }

    pub fn source_text(&self) -> String {
        let mut string = String::new();
        for value in &self.values {
            match value {
                ScalarTemplateValue::String(substring) => string.push_str(substring),
                ScalarTemplateValue::Placeholder(placeholder) => string.push_str(&placeholder.raw),
            }
        }
        string
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &PlaceholderTemplate> {
        self.values.iter().filter_map(|value| match value {
            ScalarTemplateValue::Placeholder(placeholder) => Some(placeholder),
            ScalarTemplateValue::String(_) => None,
        })
    }
}
