// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use tracing::{debug, trace};

use crate::{
    ast::{
        CompiledTemplate, MapTemplate, NodeTemplate, Placeholder, PlaceholderTemplate, ScalarTemplate,
        ScalarTemplateValue, SequenceTemplate,
    },
    parser::{Parser, PlaceholderPattern},
    path::{resolve_segments, split_path},
    validator::{join_index, join_key},
    value::{parse_json_str, Map, Value},
};

use super::{MappingResult, ResolutionPolicy, TemplateLoader};

#[derive(Clone, Copy)]
pub struct Includes<'a> {
    pub loader: &'a dyn TemplateLoader,
    pub pattern: PlaceholderPattern,
    pub max_depth: usize,
}

pub struct InterpreterRun<'a, 'd> {
    policy: ResolutionPolicy,
    includes: Option<Includes<'a>>,
    include_depth: usize,
    // Innermost last.
    scopes: Vec<&'d Value>,
    resolved: Vec<String>,
    missing: Vec<String>,
}

// Data found at the template node's structural position.
#[derive(Clone, Copy)]
enum Slot<'d> {
    Absent,
    Field(&'d Value),
    Item(&'d Value),
}

struct Unresolved {
    path: String,
    reason: String,
    template: Value,
    data: Value,
}

impl<'d> Slot<'d> {
    fn data(self) -> Option<&'d Value> {
        match self {
            Slot::Absent => None,
            Slot::Field(value) | Slot::Item(value) => Some(value),
        }
    }
}

impl<'a, 'd> InterpreterRun<'a, 'd> {
    pub fn new(policy: ResolutionPolicy, includes: Option<Includes<'a>>) -> InterpreterRun<'a, 'd> {
        InterpreterRun {
            policy,
            includes,
            include_depth: 0,
            scopes: Vec::new(),
            resolved: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn interpret(&mut self, template: &CompiledTemplate, data: &'d Value) -> MappingResult {
        self.scopes.push(data);
        let res = self.interpret_node(&template.node, Slot::Field(data), "");
        self.scopes.pop();

        match res {
            Ok(value) => {
                let resolved_names = std::mem::take(&mut self.resolved);
                if self.missing.is_empty() {
                    MappingResult::Success { value, resolved_names }
                } else {
                    debug!(missing = self.missing.len(), "mapping completed with unresolved placeholders");
                    MappingResult::PartialSuccess {
                        value,
                        resolved_names,
                        missing_names: std::mem::take(&mut self.missing),
                    }
                }
            }
            Err(unresolved) => {
                debug!(path = %unresolved.path, reason = %unresolved.reason, "mapping failed");
                let failing_path = if unresolved.path.is_empty() {
                    "$".to_string()
                } else {
                    unresolved.path
                };
                MappingResult::Failure {
                    reason: unresolved.reason,
                    failing_path,
                    template: unresolved.template,
                    data: unresolved.data,
                }
            }
        }
    }

    fn interpret_node(&mut self, node_templ: &NodeTemplate, slot: Slot<'d>, templ_path: &str) -> Result<Value, Unresolved> {
        // Placeholder-free subtrees are output verbatim, whatever the data.
        if !node_templ.has_placeholders() {
            return Ok(node_templ.to_value());
        }

        match node_templ {
            NodeTemplate::Sequence(seq_templ) => self.interpret_seq(seq_templ, node_templ, slot, templ_path),
            NodeTemplate::Map(map_templ) => self.interpret_map(map_templ, node_templ, slot, templ_path),
            NodeTemplate::Scalar(scalar_templ) => self.interpret_scalar(scalar_templ, slot, templ_path),
            NodeTemplate::Literal(value) => Ok(value.clone()),
        }
    }

    fn interpret_map(
        &mut self,
        map_templ: &MapTemplate,
        node_templ: &NodeTemplate,
        slot: Slot<'d>,
        templ_path: &str,
    ) -> Result<Value, Unresolved> {
        // No data here (or null) means the template restructures the data:
        // children keep resolving against the enclosing scopes.
        let data = slot.data().filter(|value| !value.is_null());
        let data_map = match data {
            None => None,
            Some(Value::Map(map)) => Some(map),
            Some(other) => match self.policy {
                ResolutionPolicy::Strict => {
                    return Err(Self::unresolved(
                        templ_path,
                        format!("expected map data, found {}", other.type_name()),
                        node_templ,
                        slot,
                    ))
                }
                ResolutionPolicy::Partial => {
                    self.record_missing_all(node_templ);
                    return Ok(node_templ.to_value());
                }
            },
        };

        if let Some(data) = data {
            self.scopes.push(data);
        }

        let mut entries = Map::new();
        let mut res = Ok(());
        for entry_templ in &map_templ.entries {
            let child_slot = match data_map.and_then(|map| map.get(&entry_templ.key)) {
                Some(child) => Slot::Field(child),
                None => Slot::Absent,
            };
            let child_path = join_key(templ_path, &entry_templ.key);
            match self.interpret_node(&entry_templ.value, child_slot, &child_path) {
                Ok(value) => {
                    entries.insert(entry_templ.key.clone(), value);
                }
                Err(unresolved) => {
                    res = Err(unresolved);
                    break;
                }
            }
        }

        if data.is_some() {
            self.scopes.pop();
        }

        res.map(|_| Value::Map(entries))
    }

    fn interpret_seq(
        &mut self,
        seq_templ: &SequenceTemplate,
        node_templ: &NodeTemplate,
        slot: Slot<'d>,
        templ_path: &str,
    ) -> Result<Value, Unresolved> {
        // Shape and arity violations are failures under both policies.
        let items = match slot.data() {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(Self::unresolved(
                    templ_path,
                    format!("expected list data, found {}", other.type_name()),
                    node_templ,
                    slot,
                ))
            }
            None => {
                return Err(Self::unresolved(
                    templ_path,
                    "expected list data, found nothing".to_string(),
                    node_templ,
                    slot,
                ))
            }
        };

        let mut values = Vec::with_capacity(items.len());

        if let [item_templ] = seq_templ.values.as_slice() {
            // One template item is a per-item pattern over the data list.
            for (index, item) in items.iter().enumerate() {
                let value = self.interpret_item(item_templ, item, &join_index(templ_path, index))?;
                values.push(value);
            }
            return Ok(Value::Array(values));
        }

        if seq_templ.values.len() != items.len() {
            return Err(Self::unresolved(
                templ_path,
                format!(
                    "template list has {} items but data list has {}",
                    seq_templ.values.len(),
                    items.len()
                ),
                node_templ,
                slot,
            ));
        }

        for (index, (value_templ, item)) in seq_templ.values.iter().zip(items.iter()).enumerate() {
            let value = self.interpret_item(value_templ, item, &join_index(templ_path, index))?;
            values.push(value);
        }
        Ok(Value::Array(values))
    }

    // Each list item is the innermost scope while its template is applied.
    fn interpret_item(&mut self, item_templ: &NodeTemplate, item: &'d Value, templ_path: &str) -> Result<Value, Unresolved> {
        self.scopes.push(item);
        let res = self.interpret_node(item_templ, Slot::Item(item), templ_path);
        self.scopes.pop();
        res
    }

    fn interpret_scalar(&mut self, scalar_templ: &ScalarTemplate, slot: Slot<'d>, templ_path: &str) -> Result<Value, Unresolved> {
        // A lone placeholder substitutes the typed value.
        if let [ScalarTemplateValue::Placeholder(placeholder_templ)] = scalar_templ.values.as_slice() {
            return match self.interpret_placeholder(placeholder_templ, slot, templ_path)? {
                Some(value) => Ok(value),
                None => self.unresolved_placeholder(placeholder_templ, slot, templ_path),
            };
        }

        let mut string = String::new();
        for value_templ in &scalar_templ.values {
            match value_templ {
                ScalarTemplateValue::String(substring) => string.push_str(substring),
                ScalarTemplateValue::Placeholder(placeholder_templ) => {
                    match self.interpret_placeholder(placeholder_templ, slot, templ_path)? {
                        Some(value) => string.push_str(&value.to_display_string()),
                        None => {
                            let retained = self.unresolved_placeholder(placeholder_templ, slot, templ_path)?;
                            string.push_str(&retained.to_display_string());
                        }
                    }
                }
            }
        }
        Ok(Value::String(string))
    }

    /// `Ok(None)` means the placeholder is unresolved.
    fn interpret_placeholder(
        &mut self,
        placeholder_templ: &PlaceholderTemplate,
        slot: Slot<'d>,
        templ_path: &str,
    ) -> Result<Option<Value>, Unresolved> {
        let value = match &placeholder_templ.placeholder {
            Placeholder::Literal(_) => Some(Value::String(placeholder_templ.raw.clone())),
            Placeholder::SimpleVariable { name: path, default } | Placeholder::PathVariable { path, default } => {
                match self.query(path) {
                    Some(value) => {
                        self.record_resolved(path);
                        Some(value)
                    }
                    None => default.clone().map(Value::String),
                }
            }
            Placeholder::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                let branch = match self.query(condition) {
                    Some(value) if value.is_truthy() => when_true,
                    _ => when_false,
                };
                Some(Value::String(branch.clone()))
            }
            Placeholder::ArrayExpansion => match slot {
                Slot::Field(value @ Value::Array(_)) | Slot::Item(value) => Some(value.clone()),
                Slot::Field(_) | Slot::Absent => None,
            },
            Placeholder::FileReference { path } => self.include(path, slot, templ_path)?,
        };
        Ok(value)
    }

    fn unresolved_placeholder(
        &mut self,
        placeholder_templ: &PlaceholderTemplate,
        slot: Slot<'d>,
        templ_path: &str,
    ) -> Result<Value, Unresolved> {
        let name = placeholder_templ.placeholder.name();
        trace!(path = templ_path, name = %name, "unresolved placeholder");
        match self.policy {
            ResolutionPolicy::Strict => Err(Unresolved {
                path: templ_path.to_string(),
                reason: format!("unresolved placeholder '{}'", placeholder_templ.raw),
                template: Value::String(placeholder_templ.raw.clone()),
                data: slot.data().cloned().unwrap_or_default(),
            }),
            ResolutionPolicy::Partial => {
                self.record_missing(name);
                Ok(Value::String(placeholder_templ.raw.clone()))
            }
        }
    }

    fn include(&mut self, path: &str, slot: Slot<'d>, templ_path: &str) -> Result<Option<Value>, Unresolved> {
        let Some(includes) = self.includes else {
            return Ok(None);
        };

        let fail = |reason: String| Unresolved {
            path: templ_path.to_string(),
            reason,
            template: Value::String(format!("@file:{}", path)),
            data: slot.data().cloned().unwrap_or_default(),
        };

        if self.include_depth >= includes.max_depth {
            return Err(fail(format!(
                "cannot include '{}': nesting deeper than {} levels",
                path, includes.max_depth
            )));
        }

        let text = includes
            .loader
            .load(path)
            .map_err(|err| fail(format!("cannot include '{}': {}", path, err)))?;
        let template = parse_json_str(&text).map_err(|err| fail(format!("cannot include '{}': {}", path, err)))?;
        let node_templ = Parser::new(includes.pattern)
            .parse_node(&template)
            .map_err(|err| fail(format!("cannot include '{}': {}", path, err)))?;

        debug!(path, depth = self.include_depth + 1, "applying included template");
        self.include_depth += 1;
        let res = self.interpret_node(&node_templ, slot, templ_path);
        self.include_depth -= 1;
        res.map(Some)
    }

    // Innermost scope first, falling back outward to the root data.
    fn query(&self, path: &str) -> Option<Value> {
        let segments = split_path(path)?;
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| resolve_segments(scope, &segments))
            .map(|value| value.into_owned())
    }

    fn record_missing_all(&mut self, node_templ: &NodeTemplate) {
        match node_templ {
            NodeTemplate::Sequence(seq_templ) => {
                for value in &seq_templ.values {
                    self.record_missing_all(value);
                }
            }
            NodeTemplate::Map(map_templ) => {
                for entry in &map_templ.entries {
                    self.record_missing_all(&entry.value);
                }
            }
            NodeTemplate::Scalar(scalar_templ) => {
                for placeholder_templ in scalar_templ.placeholders() {
                    if !matches!(placeholder_templ.placeholder, Placeholder::Literal(_)) {
                        self.record_missing(placeholder_templ.placeholder.name());
                    }
                }
            }
            NodeTemplate::Literal(_) => {}
        }
    }

    fn record_resolved(&mut self, name: &str) {
        if !self.resolved.iter().any(|resolved| resolved == name) {
            self.resolved.push(name.to_string());
        }
    }

    fn record_missing(&mut self, name: String) {
        if !self.missing.contains(&name) {
            self.missing.push(name);
        }
    }

    fn unresolved(templ_path: &str, reason: String, node_templ: &NodeTemplate, slot: Slot<'d>) -> Unresolved {
        Unresolved {
            path: templ_path.to_string(),
            reason,
            template: node_templ.to_value(),
            data: slot.data().cloned().unwrap_or_default(),
        }
    }
}
