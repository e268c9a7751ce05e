// Copyright (c) Chris Gunn.
// Licensed under the MIT license.


use tracing::trace;

use crate::{
    ast::{CompiledTemplate, NodeTemplate, Placeholder, ScalarTemplate},
    error::MappingError,
    interpreter::ResolutionPolicy,
    path::{parse_index, split_path},
    schema::{SchemaDefinition, SchemaType},
    value::Value,
};

/// Checks, before any substitution, that a template only references paths
/// the schema guarantees and that the data conforms to the schema.
pub struct StructuralAlignmentValidator {
    policy: ResolutionPolicy,
}

impl StructuralAlignmentValidator {
    pub fn new(policy: ResolutionPolicy) -> StructuralAlignmentValidator {
        StructuralAlignmentValidator { policy }
    }

    pub fn validate(
        &self,
        data: &Value,
        schema: &SchemaDefinition,
        template: &CompiledTemplate,
    ) -> Result<(), MappingError> {
        // The root schema is always in scope, as the root data is when applying.
        let mut scopes = vec![schema];
        self.validate_template(&template.node, Some(schema), &mut scopes, "")?;
        self.validate_data(data, schema, "")
    }

    /// Walks the template with a stack of schema scopes that mirrors the data
    /// scopes used when the template is applied.
    fn validate_template<'s>(
        &self,
        node: &NodeTemplate,
        positional: Option<&'s SchemaDefinition>,
        scopes: &mut Vec<&'s SchemaDefinition>,
        templ_path: &str,
    ) -> Result<(), MappingError> {
        if !node.has_placeholders() {
            return Ok(());
        }

        match node {
            NodeTemplate::Map(map_templ) => {
                let pushed = positional.is_some();
                if let Some(schema) = positional {
                    scopes.push(schema);
                }
                for entry in &map_templ.entries {
                    let child = positional.and_then(|schema| schema.properties.get(&entry.key));
                    let child_path = join_key(templ_path, &entry.key);
                    let res = self.validate_template(&entry.value, child, scopes, &child_path);
                    if res.is_err() {
                        if pushed {
                            scopes.pop();
                        }
                        return res;
                    }
                }
                if pushed {
                    scopes.pop();
                }
                Ok(())
            }
            NodeTemplate::Sequence(seq_templ) => {
                if let Some(schema) = positional {
                    if !schema.types.is_empty() && !schema.types.contains(&SchemaType::Array) {
                        return Err(mismatch(
                            templ_path,
                            format!("template has a list where the schema declares {}", schema.type_names()),
                        ));
                    }
                }
                let items = positional.and_then(|schema| schema.items.as_deref());
                for (index, value) in seq_templ.values.iter().enumerate() {
                    if let Some(items) = items {
                        scopes.push(items);
                    }
                    let res = self.validate_template(value, items, scopes, &join_index(templ_path, index));
                    if items.is_some() {
                        scopes.pop();
                    }
                    res?;
                }
                Ok(())
            }
            NodeTemplate::Scalar(scalar_templ) => self.validate_scalar(scalar_templ, positional, scopes, templ_path),
            NodeTemplate::Literal(_) => Ok(()),
        }
    }

    fn validate_scalar(
        &self,
        scalar_templ: &ScalarTemplate,
        positional: Option<&SchemaDefinition>,
        scopes: &[&SchemaDefinition],
        templ_path: &str,
    ) -> Result<(), MappingError> {
        for placeholder_templ in scalar_templ.placeholders() {
            let placeholder = &placeholder_templ.placeholder;
            match placeholder {
                Placeholder::SimpleVariable { .. } | Placeholder::PathVariable { .. } => {}
                Placeholder::ArrayExpansion => {
                    if let Some(schema) = positional {
                        if !schema.types.is_empty() && !schema.types.contains(&SchemaType::Array) {
                            return Err(mismatch(
                                templ_path,
                                format!("'@items' used where the schema declares {}", schema.type_names()),
                            ));
                        }
                    }
                    continue;
                }
                // Conditionals always fall back to their false branch; includes are checked
                // when the referenced template is loaded.
                Placeholder::Conditional { .. } | Placeholder::FileReference { .. } | Placeholder::Literal(_) => {
                    continue
                }
            }

            let Some(path) = placeholder.data_path() else {
                continue;
            };
            let has_default = placeholder.default().is_some();
            let reach = split_path(path).and_then(|segments| {
                scopes
                    .iter()
                    .rev()
                    .find_map(|schema| reach_schema_path(schema, &segments))
            });

            match reach {
                Some(Reach::Guaranteed) => {}
                Some(Reach::Optional) => {
                    if self.policy == ResolutionPolicy::Strict && !has_default {
                        return Err(mismatch(
                            templ_path,
                            format!("'{}' is optional in the schema and the placeholder has no default", path),
                        ));
                    }
                }
                None => {
                    if !has_default {
                        return Err(mismatch(templ_path, format!("'{}' is not declared by the schema", path)));
                    }
                    trace!(path, "schema does not declare placeholder path, default applies");
                }
            }
        }
        Ok(())
    }

    fn validate_data(&self, value: &Value, schema: &SchemaDefinition, data_path: &str) -> Result<(), MappingError> {
        if !schema.allows(value) {
            return Err(mismatch(
                data_path,
                format!("expected {}, found {}", schema.type_names(), value.type_name()),
            ));
        }

        match value {
            Value::Map(map) => {
                for name in &schema.required {
                    if !map.contains_key(name) {
                        return Err(mismatch(&join_key(data_path, name), "required field is missing".to_string()));
                    }
                }
                for (key, child) in map {
                    let child_path = join_key(data_path, key);
                    match schema.properties.get(key) {
                        Some(property) => self.validate_data(child, property, &child_path)?,
                        None if schema.additional_properties == Some(false) => {
                            return Err(mismatch(&child_path, "field is not allowed by the schema".to_string()))
                        }
                        None => {}
                    }
                }
                Ok(())
            }
            Value::Array(items) => {
                let Some(item_schema) = schema.items.as_deref() else {
                    return Ok(());
                };
                for (index, item) in items.iter().enumerate() {
                    self.validate_data(item, item_schema, &join_index(data_path, index))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reach {
    Guaranteed,
    // Reachable, but through a field that is not required or a list index.
    Optional,
}

fn reach_schema_path(schema: &SchemaDefinition, segments: &[&str]) -> Option<Reach> {
    let mut current = schema;
    let mut reach = Reach::Guaranteed;
    for (position, segment) in segments.iter().enumerate() {
        if let Some(property) = current.properties.get(*segment) {
            if !current.is_required(segment) {
                reach = Reach::Optional;
            }
            current = property;
            continue;
        }

        let items = current.items.as_deref()?;
        if *segment == "length" && position + 1 == segments.len() {
            return Some(reach);
        }
        parse_index(segment)?;
        reach = Reach::Optional;
        current = items;
    }
    Some(reach)
}

fn mismatch(path: &str, reason: String) -> MappingError {
    let path = if path.is_empty() { "$" } else { path };
    MappingError::StructuralMismatch {
        path: path.to_string(),
        reason,
    }
}

pub(crate) fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

pub(crate) fn join_index(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}
