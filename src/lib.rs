// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Maps structured front matter onto output templates.
//!
//! A template is a JSON-like skeleton whose string leaves may hold
//! placeholders. Applying it to a data value yields a value with the
//! template's shape, which is then encoded as JSON, YAML, XML or Markdown.

pub mod ast;
pub mod codec;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod path;
pub mod process_template;
pub mod schema;
pub mod validator;
pub mod value;

pub use codec::OutputFormat;
pub use config::MappingConfig;
pub use error::MappingError;
pub use interpreter::{apply, MappingResult, ResolutionPolicy, TemplateApplier, TemplateLoader};
pub use parser::{parse_placeholder, PlaceholderPattern};
pub use path::resolve;
pub use process_template::{
    map_template, MappingEngine, MappingOptions, ProcessingContext, RenderedOutput, ResolutionStrategy, Template,
    TemplateCache,
};
pub use schema::SchemaDefinition;
pub use validator::StructuralAlignmentValidator;
pub use value::{parse_json_str, parse_yaml_str, split_front_matter, Value};
