// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod variable_arg;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Error};
use clap::{CommandFactory, FromArgMatches, Parser};
use frontmap::{
    value::{parse_json_str, parse_yaml_str, split_front_matter, Map},
    MappingConfig, MappingEngine, ProcessingContext, ResolutionPolicy, SchemaDefinition, Template, TemplateLoader,
    Value,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use variable_arg::collect_variable_args;

#[derive(Parser, Debug)]
#[command(
    name = "frontmap",
    version,
    about = "Maps document front matter onto an output template"
)]
struct Cli {
    /// Template file: a JSON skeleton, or raw text with --text.
    #[arg(long, short = 't', value_name = "FILE")]
    template: PathBuf,

    /// Data file: JSON, YAML, or Markdown with a front matter header.
    #[arg(long, short = 'd', value_name = "FILE")]
    data: PathBuf,

    /// JSON schema the data and template are checked against.
    #[arg(long, short = 's', value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Output format: json, yaml, xml or markdown.
    #[arg(long, short = 'f', value_name = "FORMAT")]
    format: Option<String>,

    /// Placeholder delimiters: double-brace, dollar-brace, percent or single-brace.
    #[arg(long, short = 'p', value_name = "PATTERN")]
    pattern: Option<String>,

    /// Leave unresolved placeholders in the output instead of failing.
    #[arg(long)]
    partial: bool,

    /// Treat the template as raw text.
    #[arg(long)]
    text: bool,

    /// Config file (JSON or YAML). Flags take precedence.
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Set a data field to a string.
    #[arg(long, value_name = "PATH=VALUE")]
    set: Vec<String>,

    /// Set a data field to a JSON value.
    #[arg(long, value_name = "PATH=JSON")]
    set_json: Vec<String>,

    /// Write to FILE instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Resolves `@file:` references relative to the template's directory.
struct FsTemplateLoader {
    base_dir: PathBuf,
}

impl TemplateLoader for FsTemplateLoader {
    fn load(&self, path: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let full_path = self.base_dir.join(path);
        debug!(path = %full_path.display(), "loading referenced template");
        fs::read_to_string(&full_path).map_err(|err| format!("{}: {}", full_path.display(), err).into())
    }
}

fn main() -> Result<(), Error> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let overrides = collect_variable_args(&matches)?;

    let template_text = read_file(&cli.template, "template")?;
    let template = if config.text_template {
        Template::from_text(template_text)
    } else {
        Template::from_json_str(&template_text)
            .with_context(|| format!("invalid template {}", cli.template.display()))?
    };

    let mut data = load_data(&cli.data)?;
    for arg in overrides {
        if !data.set_path(&arg.path, arg.value) {
            return Err(anyhow!("cannot set '{}': path crosses a non-map value", arg.path));
        }
    }

    let schema = match &cli.schema {
        Some(path) => Some(
            SchemaDefinition::from_json_str(&read_file(path, "schema")?)
                .with_context(|| format!("invalid schema {}", path.display()))?,
        ),
        None => None,
    };
    let context = match &schema {
        Some(schema) => ProcessingContext::SchemaGuided(schema),
        None => ProcessingContext::SimpleReplacement,
    };

    let loader = FsTemplateLoader {
        base_dir: cli.template.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let engine = MappingEngine::new(config.options()).with_loader(&loader);
    let output = engine.map(&data, &template, config.format, context)?;

    if !output.missing_names.is_empty() {
        warn!(missing = %output.missing_names.join(", "), "placeholders left unresolved");
    }

    match &cli.output {
        Some(path) => fs::write(path, &output.text).with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", output.text),
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "frontmap=debug" } else { "frontmap=warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<MappingConfig, Error> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = read_file(path, "config")?;
            let config = if has_extension(path, &["json"]) {
                MappingConfig::from_json_str(&text)
            } else {
                MappingConfig::from_yaml_str(&text)
            };
            config.with_context(|| format!("invalid config {}", path.display()))?
        }
        None => MappingConfig::default(),
    };

    if let Some(format) = &cli.format {
        config.format = format.parse()?;
    }
    if let Some(pattern) = &cli.pattern {
        config.pattern = pattern.parse()?;
    }
    if cli.partial {
        config.policy = ResolutionPolicy::Partial;
    }
    if cli.text {
        config.text_template = true;
    }
    Ok(config)
}

fn load_data(path: &Path) -> Result<Value, Error> {
    let text = read_file(path, "data")?;
    let value = if has_extension(path, &["json"]) {
        parse_json_str(&text)?
    } else if has_extension(path, &["md", "markdown"]) {
        match split_front_matter(&text) {
            (Some(header), _) => single_yaml_doc(header)?,
            (None, _) => Value::Map(Map::new()),
        }
    } else {
        single_yaml_doc(&text)?
    };
    Ok(value)
}

fn single_yaml_doc(text: &str) -> Result<Value, Error> {
    let docs = parse_yaml_str(text)?;
    match &docs[..] {
        [] => Ok(Value::Null),
        [doc] => Ok(doc.clone()),
        _ => Err(anyhow!("data yaml must only have a single document")),
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|candidate| ext.eq_ignore_ascii_case(candidate)))
}

fn read_file(path: &Path, kind: &str) -> Result<String, Error> {
    fs::read_to_string(path).with_context(|| format!("failed to read {} file {}", kind, path.display()))
}
