// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod cache;

#[cfg(test)]
mod tests;

use std::{error::Error, sync::Arc};

use tracing::{debug, warn};

use crate::{
    ast::CompiledTemplate,
    codec::OutputFormat,
    error::MappingError,
    interpreter::{MappingResult, ResolutionPolicy, TemplateApplier, TemplateLoader},
    parser::{Parser, PlaceholderPattern},
    schema::SchemaDefinition,
    validator::StructuralAlignmentValidator,
    value::{parse_json_str, Value},
};

pub use cache::TemplateCache;

pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 8;

/// Template source, before compilation.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    source: TemplateSource,
}

#[derive(Clone, Debug, PartialEq)]
enum TemplateSource {
    // JSON-like skeleton with placeholder leaves.
    Structured(Value),
    // Raw text with inline placeholders, output verbatim once resolved.
    Text(String),
}

impl Template {
    pub fn from_json_str(text: &str) -> Result<Template, MappingError> {
        let value = parse_json_str(text)?;
        Ok(Template::from_value(value))
    }

    pub fn from_value(value: Value) -> Template {
        Template {
            source: TemplateSource::Structured(value),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Template {
        Template {
            source: TemplateSource::Text(text.into()),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.source, TemplateSource::Text(_))
    }

    pub fn to_value(&self) -> Value {
        match &self.source {
            TemplateSource::Structured(value) => value.clone(),
            TemplateSource::Text(text) => Value::String(text.clone()),
        }
    }

    fn compile(&self, parser: &Parser) -> Result<CompiledTemplate, MappingError> {
        match &self.source {
            TemplateSource::Structured(value) => parser.parse(value),
            TemplateSource::Text(text) => parser.parse_text(text),
        }
    }

    // Debug output keeps value kinds apart, including non-finite reals.
    fn cache_key(&self) -> String {
        match &self.source {
            TemplateSource::Structured(value) => format!("value:{:?}", value),
            TemplateSource::Text(text) => format!("text:{}", text),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MappingOptions {
    pub pattern: PlaceholderPattern,
    pub policy: ResolutionPolicy,
    /// How deeply `@file:` references may nest.
    pub max_include_depth: usize,
}

impl Default for MappingOptions {
    fn default() -> Self {
        MappingOptions {
            pattern: PlaceholderPattern::default(),
            policy: ResolutionPolicy::default(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

/// Which stages run around the template applier.
#[derive(Clone, Copy, Debug)]
pub enum ProcessingContext<'s> {
    /// Substitution only.
    SimpleReplacement,
    /// Structural validation against the schema, then substitution.
    SchemaGuided(&'s SchemaDefinition),
    /// Optional validation, substitution, then the engine's resolution
    /// strategy for anything substitution could not complete.
    Staged { schema: Option<&'s SchemaDefinition> },
}

impl<'s> ProcessingContext<'s> {
    pub fn schema(&self) -> Option<&'s SchemaDefinition> {
        match self {
            ProcessingContext::SimpleReplacement => None,
            ProcessingContext::SchemaGuided(schema) => Some(*schema),
            ProcessingContext::Staged { schema } => *schema,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProcessingContext::SimpleReplacement => "simple-replacement",
            ProcessingContext::SchemaGuided(_) => "schema-guided",
            ProcessingContext::Staged { .. } => "staged",
        }
    }
}

/// Alternate way of mapping data onto a template, e.g. an external service.
/// Used by `ProcessingContext::Staged` when substitution is incomplete.
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn resolve(&self, data: &Value, template: &Value) -> Result<Value, Box<dyn Error + Send + Sync>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedOutput {
    pub text: String,
    pub resolved_names: Vec<String>,
    pub missing_names: Vec<String>,
}

/// Compiles, validates, applies and encodes templates with a fixed set of
/// options and collaborators.
pub struct MappingEngine<'a> {
    options: MappingOptions,
    loader: Option<&'a dyn TemplateLoader>,
    strategy: Option<&'a dyn ResolutionStrategy>,
    cache: Option<&'a TemplateCache>,
}

impl<'a> MappingEngine<'a> {
    pub fn new(options: MappingOptions) -> MappingEngine<'a> {
        MappingEngine {
            options,
            loader: None,
            strategy: None,
            cache: None,
        }
    }

    pub fn with_loader(mut self, loader: &'a dyn TemplateLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_strategy(mut self, strategy: &'a dyn ResolutionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_cache(mut self, cache: &'a TemplateCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn options(&self) -> &MappingOptions {
        &self.options
    }

    pub fn compile(&self, template: &Template) -> Result<Arc<CompiledTemplate>, MappingError> {
        match self.cache {
            Some(cache) => cache.get_or_compile(self.options.pattern, template),
            None => {
                let parser = Parser::new(self.options.pattern);
                template.compile(&parser).map(Arc::new)
            }
        }
    }

    /// Validation problems are returned as errors; resolution problems come
    /// back as `MappingResult::Failure`.
    pub fn apply(
        &self,
        data: &Value,
        template: &Template,
        context: ProcessingContext,
    ) -> Result<MappingResult, MappingError> {
        let compiled = self.compile(template)?;
        debug!(
            context = context.name(),
            policy = %self.options.policy,
            pattern = %self.options.pattern,
            "applying template"
        );

        if let Some(schema) = context.schema() {
            StructuralAlignmentValidator::new(self.options.policy).validate(data, schema, &compiled)?;
        }

        let result = self.applier().apply(data, &compiled);
        let incomplete = !matches!(result, MappingResult::Success { .. });
        if incomplete && matches!(context, ProcessingContext::Staged { .. }) {
            return Ok(self.run_strategy(data, template, result));
        }
        Ok(result)
    }

    pub fn map(
        &self,
        data: &Value,
        template: &Template,
        format: OutputFormat,
        context: ProcessingContext,
    ) -> Result<RenderedOutput, MappingError> {
        let (value, resolved_names, missing_names) = self.apply(data, template, context)?.into_parts()?;
        let text = if template.is_text() {
            match value {
                Value::String(text) => text,
                other => other.to_display_string(),
            }
        } else {
            format.encode(&value)?
        };
        debug!(format = %format, bytes = text.len(), "encoded mapping output");

        Ok(RenderedOutput {
            text,
            resolved_names,
            missing_names,
        })
    }

    fn applier(&self) -> TemplateApplier<'a> {
        let applier = TemplateApplier::new(self.options.policy);
        match self.loader {
            Some(loader) => applier.with_loader(loader, self.options.pattern, self.options.max_include_depth),
            None => applier,
        }
    }

    fn run_strategy(&self, data: &Value, template: &Template, result: MappingResult) -> MappingResult {
        let Some(strategy) = self.strategy else {
            return result;
        };

        debug!(strategy = strategy.name(), "substitution incomplete, running resolution strategy");
        match strategy.resolve(data, &template.to_value()) {
            Ok(value) => MappingResult::Success {
                value,
                resolved_names: result.resolved_names().to_vec(),
            },
            Err(err) => {
                warn!(strategy = strategy.name(), error = %err, "resolution strategy failed");
                match result {
                    MappingResult::Failure {
                        reason,
                        failing_path,
                        template,
                        data,
                    } => MappingResult::Failure {
                        reason: format!("{}; strategy '{}' failed: {}", reason, strategy.name(), err),
                        failing_path,
                        template,
                        data,
                    },
                    other => other,
                }
            }
        }
    }
}

/// One-shot mapping with default options: validates against `schema` when
/// given, applies the template and encodes the result.
pub fn map_template(
    data: &Value,
    template: &Template,
    format: OutputFormat,
    schema: Option<&SchemaDefinition>,
    policy: ResolutionPolicy,
) -> Result<RenderedOutput, MappingError> {
    let options = MappingOptions {
        policy,
        ..MappingOptions::default()
    };
    let context = match schema {
        Some(schema) => ProcessingContext::SchemaGuided(schema),
        None => ProcessingContext::SimpleReplacement,
    };
    MappingEngine::new(options).map(data, template, format, context)
}
