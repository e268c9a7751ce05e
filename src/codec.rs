// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Serializers from a resolved `Value` tree to output text.

mod json;
mod markdown;
mod xml;
mod yaml;


use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{error::MappingError, value::Value};

pub use json::is_json_text;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Xml,
    /// Human readable projection. Does not round-trip.
    Markdown,
}

impl OutputFormat {
    pub fn encode(&self, value: &Value) -> Result<String, MappingError> {
        match self {
            OutputFormat::Json => json::encode(value),
            OutputFormat::Yaml => Ok(yaml::encode(value)),
            OutputFormat::Xml => xml::encode(value),
            OutputFormat::Markdown => Ok(markdown::encode(value)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Xml => "xml",
            OutputFormat::Markdown => "md",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = MappingError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "xml" => Ok(OutputFormat::Xml),
            "markdown" | "md" | "custom" => Ok(OutputFormat::Markdown),
            "toml" | "html" | "csv" | "handlebars" => Err(MappingError::UnsupportedFormat(name.trim().to_string())),
            other => Err(MappingError::InvalidFormat(format!("unknown output format '{}'", other))),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = MappingError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Xml => "xml",
            OutputFormat::Markdown => "markdown",
        };
        f.write_str(name)
    }
}
