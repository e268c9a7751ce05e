// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod interpreter_run;


use std::{error::Error, fmt, str::FromStr};

use serde::Deserialize;

use crate::{ast::CompiledTemplate, error::MappingError, parser::PlaceholderPattern, value::Value};

use interpreter_run::{Includes, InterpreterRun};

/// What happens to a placeholder that cannot be resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    /// Any unresolved placeholder fails its enclosing node, and so the mapping.
    #[default]
    Strict,
    /// Unresolved placeholders stay in the output as written and are reported.
    Partial,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MappingResult {
    Success {
        value: Value,
        resolved_names: Vec<String>,
    },
    PartialSuccess {
        value: Value,
        resolved_names: Vec<String>,
        missing_names: Vec<String>,
    },
    Failure {
        reason: String,
        failing_path: String,
        // Template fragment and data it was matched against.
        template: Value,
        data: Value,
    },
}

/// Source of templates named by `@file:` references. Paths are passed
/// through exactly as written in the template.
pub trait TemplateLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// Walks a compiled template in lock-step with the data.
#[derive(Clone, Copy)]
pub struct TemplateApplier<'a> {
    policy: ResolutionPolicy,
    includes: Option<Includes<'a>>,
}

impl<'a> TemplateApplier<'a> {
    pub fn new(policy: ResolutionPolicy) -> TemplateApplier<'a> {
        TemplateApplier { policy, includes: None }
    }

    /// Enables `@file:` references. Included templates are compiled with
    /// `pattern` and may nest up to `max_depth` levels.
    pub fn with_loader(mut self, loader: &'a dyn TemplateLoader, pattern: PlaceholderPattern, max_depth: usize) -> Self {
        self.includes = Some(Includes {
            loader,
            pattern,
            max_depth,
        });
        self
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn apply(&self, data: &Value, template: &CompiledTemplate) -> MappingResult {
        let mut run = InterpreterRun::new(self.policy, self.includes);
        run.interpret(template, data)
    }
}

/// Applies `template` to `data` without file references.
pub fn apply(data: &Value, template: &CompiledTemplate, policy: ResolutionPolicy) -> MappingResult {
    TemplateApplier::new(policy).apply(data, template)
}

impl MappingResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, MappingResult::Failure { .. })
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            MappingResult::Success { value, .. } | MappingResult::PartialSuccess { value, .. } => Some(value),
            MappingResult::Failure { .. } => None,
        }
    }

    pub fn resolved_names(&self) -> &[String] {
        match self {
            MappingResult::Success { resolved_names, .. } | MappingResult::PartialSuccess { resolved_names, .. } => {
                resolved_names
            }
            MappingResult::Failure { .. } => &[],
        }
    }

    pub fn missing_names(&self) -> &[String] {
        match self {
            MappingResult::PartialSuccess { missing_names, .. } => missing_names,
            _ => &[],
        }
    }

    /// Converts a failure into `MappingError::TemplateMappingFailed`.
    pub fn into_result(self) -> Result<MappingResult, MappingError> {
        match self {
            MappingResult::Failure {
                reason,
                failing_path,
                template,
                data,
            } => Err(failure_error(reason, failing_path, &template, &data)),
            result => Ok(result),
        }
    }

    /// Splits an outcome into its value, resolved names and missing names.
    pub fn into_parts(self) -> Result<(Value, Vec<String>, Vec<String>), MappingError> {
        match self {
            MappingResult::Success { value, resolved_names } => Ok((value, resolved_names, Vec::new())),
            MappingResult::PartialSuccess {
                value,
                resolved_names,
                missing_names,
            } => Ok((value, resolved_names, missing_names)),
            MappingResult::Failure {
                reason,
                failing_path,
                template,
                data,
            } => Err(failure_error(reason, failing_path, &template, &data)),
        }
    }
}

fn failure_error(reason: String, failing_path: String, template: &Value, data: &Value) -> MappingError {
    MappingError::TemplateMappingFailed {
        path: failing_path,
        reason,
        template: serde_json::to_string(template).unwrap_or_default(),
        data: serde_json::to_string(data).unwrap_or_default(),
    }
}

impl FromStr for ResolutionPolicy {
    type Err = MappingError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ResolutionPolicy::Strict),
            "partial" => Ok(ResolutionPolicy::Partial),
            other => Err(MappingError::InvalidFormat(format!("unknown resolution policy '{}'", other))),
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolutionPolicy::Strict => f.write_str("strict"),
            ResolutionPolicy::Partial => f.write_str("partial"),
        }
    }
}
