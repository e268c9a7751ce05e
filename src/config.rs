// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use serde::Deserialize;

use crate::{
    codec::OutputFormat,
    error::MappingError,
    interpreter::ResolutionPolicy,
    parser::PlaceholderPattern,
    process_template::{MappingOptions, DEFAULT_MAX_INCLUDE_DEPTH},
    value::{parse_json_str, parse_yaml_str, Value},
};

/// Mapping settings as read from a JSON or YAML config file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MappingConfig {
    pub pattern: PlaceholderPattern,
    pub policy: ResolutionPolicy,
    pub format: OutputFormat,
    pub max_include_depth: usize,
    /// Treat the template as raw text rather than a JSON skeleton.
    pub text_template: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig {
            pattern: PlaceholderPattern::default(),
            policy: ResolutionPolicy::default(),
            format: OutputFormat::default(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            text_template: false,
        }
    }
}

impl MappingConfig {
    pub fn from_json_str(text: &str) -> Result<MappingConfig, MappingError> {
        let value = parse_json_str(text)?;
        MappingConfig::from_value(&value)
    }

    /// An empty document gives the defaults.
    pub fn from_yaml_str(text: &str) -> Result<MappingConfig, MappingError> {
        let docs = parse_yaml_str(text)?;
        match &docs[..] {
            [] | [Value::Null] => Ok(MappingConfig::default()),
            [config] => MappingConfig::from_value(config),
            _ => Err(MappingError::ParseError(
                "config yaml must only have a single document".to_string(),
            )),
        }
    }

    pub fn from_value(value: &Value) -> Result<MappingConfig, MappingError> {
        let json = serde_json::to_value(value).map_err(|err| MappingError::InvalidFormat(format!("invalid config: {}", err)))?;
        serde_json::from_value(json).map_err(|err| MappingError::InvalidFormat(format!("invalid config: {}", err)))
    }

    pub fn options(&self) -> MappingOptions {
        MappingOptions {
            pattern: self.pattern,
            policy: self.policy,
            max_include_depth: self.max_include_depth,
        }
    }
}
