use std::{collections::HashMap, fs, io, path::Path};

use super::*;
use crate::config::MappingConfig;

macro_rules! testlist {
    ($($name:ident,)*) => {
    $(
        #[test]
        fn $name() {
            run_test(stringify!($name))
        }
    )*
    }
}

testlist! {
    array_expansion,
    arity_mismatch,
    conditional,
    default_fallback,
    embedded_json,
    markdown_output,
    mixed_text,
    nested_scope,
    partial_missing,
    positional_substitution,
    schema_guided,
    schema_mismatch,
    strict_missing,
    text_template,
    xml_output,
}

fn run_test(name: &str) {
    let rootdir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let test_data_dir = rootdir.join("src/process_template/tests/testdata");

    let test_file = test_data_dir.join(format!("tests/{}.txt", name));
    let test_data_file = test_data_dir.join(format!("tests/{}-data.txt", name));
    let test_schema_file = test_data_dir.join(format!("tests/{}-schema.txt", name));
    let test_config_file = test_data_dir.join(format!("tests/{}-config.txt", name));
    let expected_file = test_data_dir.join(format!("expected/{}.txt", name));
    let actual_dir = test_data_dir.join("actual");
    let actual_file = actual_dir.join(format!("{}.txt", name));

    let test = fs::read_to_string(&test_file).unwrap();
    let test_data = read_optional(&test_data_file).unwrap_or_else(|| "{}".to_string());
    let test_schema = read_optional(&test_schema_file);
    let test_config = read_optional(&test_config_file).unwrap_or_default();

    let result = process(&test, &test_data, test_schema.as_deref(), &test_config);
    let actual = format_result(result);

    fs::create_dir_all(actual_dir).unwrap();
    fs::write(actual_file, &actual).unwrap();

    let expected = fs::read_to_string(expected_file).unwrap();
    assert_eq!(expected, actual);
}

fn read_optional(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => panic!("{}: {}", path.display(), err),
    }
}

fn process(template: &str, data: &str, schema: Option<&str>, config: &str) -> Result<RenderedOutput, MappingError> {
    let config = MappingConfig::from_yaml_str(config)?;
    let template = if config.text_template {
        Template::from_text(template)
    } else {
        Template::from_json_str(template)?
    };
    let data = parse_json_str(data)?;
    let schema = schema.map(SchemaDefinition::from_json_str).transpose()?;
    let context = match &schema {
        Some(schema) => ProcessingContext::SchemaGuided(schema),
        None => ProcessingContext::SimpleReplacement,
    };

    MappingEngine::new(config.options()).map(&data, &template, config.format, context)
}

fn format_result(result: Result<RenderedOutput, MappingError>) -> String {
    let mut string = String::new();

    string.push_str("ERROR: ");
    let output = match result {
        Ok(output) => output,
        Err(err) => {
            string.push_str(&err.to_string());
            return string;
        }
    };

    string.push_str("<None>\n");
    string.push_str("MISSING: ");
    if output.missing_names.is_empty() {
        string.push_str("<None>");
    } else {
        string.push_str(&output.missing_names.join(", "));
    }
    string.push('\n');
    string.push_str("OUTPUT:\n");
    string.push_str(&output.text);
    string
}

struct MemoryLoader(HashMap<&'static str, &'static str>);

impl TemplateLoader for MemoryLoader {
    fn load(&self, path: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.0
            .get(path)
            .map(|text| text.to_string())
            .ok_or_else(|| format!("no template named '{}'", path).into())
    }
}

struct FixedStrategy(Result<&'static str, &'static str>);

impl ResolutionStrategy for FixedStrategy {
    fn name(&self) -> &str {
        "fixed"
    }

    fn resolve(&self, _data: &Value, _template: &Value) -> Result<Value, Box<dyn Error + Send + Sync>> {
        match self.0 {
            Ok(text) => Ok(parse_json_str(text)?),
            Err(message) => Err(message.into()),
        }
    }
}

#[test]
fn map_template_entry_point() {
    let data = parse_json_str(r#"{"title": "Hello", "tags": ["a"]}"#).unwrap();
    let template = Template::from_json_str(r#"{"name": "{{title}}", "tags": ["{{@items}}"]}"#).unwrap();
    let schema = SchemaDefinition::from_json_str(
        r#"{"type": "object", "required": ["title", "tags"], "properties": {"title": {"type": "string"}, "tags": {"type": "array"}}}"#,
    )
    .unwrap();

    let output = map_template(&data, &template, OutputFormat::Yaml, Some(&schema), ResolutionPolicy::Strict).unwrap();
    assert_eq!(output.text, "name: Hello\ntags:\n  - a\n");
    assert_eq!(output.resolved_names, vec!["title".to_string()]);
    assert!(output.missing_names.is_empty());
}

#[test]
fn invalid_template_json_is_a_parse_error() {
    assert!(matches!(Template::from_json_str("{\"a\": "), Err(MappingError::ParseError(_))));
}

#[test]
fn cache_does_not_change_results() {
    let cache = TemplateCache::new();
    let data = parse_json_str(r#"{"title": "Hello"}"#).unwrap();
    let template = Template::from_json_str(r#"{"name": "{{title}}"}"#).unwrap();
    let cached = MappingEngine::new(MappingOptions::default()).with_cache(&cache);
    let uncached = MappingEngine::new(MappingOptions::default());

    let first = cached
        .map(&data, &template, OutputFormat::Json, ProcessingContext::SimpleReplacement)
        .unwrap();
    let second = cached
        .map(&data, &template, OutputFormat::Json, ProcessingContext::SimpleReplacement)
        .unwrap();
    let plain = uncached
        .map(&data, &template, OutputFormat::Json, ProcessingContext::SimpleReplacement)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first, plain);
    assert_eq!(cache.len(), 1);

    // Same source under another pattern is a separate entry.
    let options = MappingOptions {
        pattern: PlaceholderPattern::DollarBrace,
        ..MappingOptions::default()
    };
    MappingEngine::new(options).with_cache(&cache).compile(&template).unwrap();
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn cache_keeps_non_finite_reals_apart() {
    let cache = TemplateCache::new();
    let with_real = |real: f64| {
        let mut map = crate::value::Map::new();
        map.insert("a".to_string(), Value::Real(real));
        Template::from_value(Value::Map(map))
    };
    let with_null = Template::from_json_str(r#"{"a": null}"#).unwrap();

    cache.get_or_compile(PlaceholderPattern::DoubleBrace, &with_real(f64::NAN)).unwrap();
    cache.get_or_compile(PlaceholderPattern::DoubleBrace, &with_real(f64::INFINITY)).unwrap();
    let compiled = cache.get_or_compile(PlaceholderPattern::DoubleBrace, &with_null).unwrap();
    assert_eq!(cache.len(), 3);
    assert_eq!(compiled.node.to_value(), with_null.to_value());
}

#[test]
fn file_references_through_the_engine() {
    let loader = MemoryLoader(HashMap::from([("author.json", r#"{"name": "{{author}}"}"#)]));
    let engine = MappingEngine::new(MappingOptions::default()).with_loader(&loader);
    let data = parse_json_str(r#"{"author": "Ada"}"#).unwrap();

    let template = Template::from_json_str(r#"{"by": "{{@file:author.json}}"}"#).unwrap();
    let output = engine
        .map(&data, &template, OutputFormat::Json, ProcessingContext::SimpleReplacement)
        .unwrap();
    assert_eq!(output.text, "{\n  \"by\": {\n    \"name\": \"Ada\"\n  }\n}\n");

    let template = Template::from_json_str(r#"{"by": "{{@file:other.json}}"}"#).unwrap();
    let err = engine
        .map(&data, &template, OutputFormat::Json, ProcessingContext::SimpleReplacement)
        .unwrap_err();
    assert!(matches!(err, MappingError::TemplateMappingFailed { ref path, .. } if path == "by"));
}

#[test]
fn staged_context_falls_back_to_strategy() {
    let data = parse_json_str("{}").unwrap();
    let template = Template::from_json_str(r#"{"a": "{{missing}}"}"#).unwrap();

    let strategy = FixedStrategy(Ok(r#"{"a": "from strategy"}"#));
    let engine = MappingEngine::new(MappingOptions::default()).with_strategy(&strategy);
    let output = engine
        .map(&data, &template, OutputFormat::Json, ProcessingContext::Staged { schema: None })
        .unwrap();
    assert_eq!(output.text, "{\n  \"a\": \"from strategy\"\n}\n");

    // Other contexts never consult the strategy.
    let err = engine
        .map(&data, &template, OutputFormat::Json, ProcessingContext::SimpleReplacement)
        .unwrap_err();
    assert!(matches!(err, MappingError::TemplateMappingFailed { .. }));
}

#[test]
fn strategy_errors_become_mapping_failures() {
    let data = parse_json_str("{}").unwrap();
    let template = Template::from_json_str(r#"{"a": "{{missing}}"}"#).unwrap();
    let strategy = FixedStrategy(Err("service unavailable"));
    let engine = MappingEngine::new(MappingOptions::default()).with_strategy(&strategy);

    let err = engine
        .map(&data, &template, OutputFormat::Json, ProcessingContext::Staged { schema: None })
        .unwrap_err();
    assert_eq!(
        err,
        MappingError::TemplateMappingFailed {
            path: "a".to_string(),
            reason: "unresolved placeholder '{{missing}}'; strategy 'fixed' failed: service unavailable".to_string(),
            template: r#""{{missing}}""#.to_string(),
            data: "null".to_string(),
        }
    );
}
