use super::*;
use crate::{ast::Placeholder, value::parse_json_str};

fn variable(name: &str) -> Placeholder {
    Placeholder::SimpleVariable {
        name: name.to_string(),
        default: None,
    }
}

fn scalar_values(pattern: PlaceholderPattern, text: &str) -> Vec<ScalarTemplateValue> {
    Parser::new(pattern).parse_scalar(text).unwrap().values
}

fn placeholder(raw: &str, placeholder: Placeholder) -> ScalarTemplateValue {
    ScalarTemplateValue::Placeholder(PlaceholderTemplate {
        raw: raw.to_string(),
        placeholder,
    })
}

fn string(text: &str) -> ScalarTemplateValue {
    ScalarTemplateValue::String(text.to_string())
}

#[test]
fn splits_text_and_placeholders() {
    assert_eq!(
        scalar_values(PlaceholderPattern::DoubleBrace, "Hello {{name}}, bye {{ other }}!"),
        vec![
            string("Hello "),
            placeholder("{{name}}", variable("name")),
            string(", bye "),
            placeholder("{{ other }}", variable("other")),
            string("!"),
        ]
    );
}

#[test]
fn each_pattern_finds_its_own_delimiters() {
    let cases = [
        (PlaceholderPattern::DoubleBrace, "{a} {{a}} %a%", "{{a}}", "a"),
        (PlaceholderPattern::DollarBrace, "{b} ${b} {{b}}", "${b}", "b"),
        (PlaceholderPattern::Percent, "{{c}} %c% {c}", "%c%", "c"),
        (PlaceholderPattern::SingleBrace, "{{skip}} {d} %d%", "{d}", "d"),
    ];
    for (pattern, text, raw, name) in cases {
        let values = scalar_values(pattern, text);
        let found = values
            .iter()
            .filter_map(|value| match value {
                ScalarTemplateValue::Placeholder(placeholder) => Some(placeholder),
                ScalarTemplateValue::String(_) => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(found.len(), 1, "{}", pattern);
        assert_eq!(found[0].raw, raw);
        assert_eq!(found[0].placeholder, variable(name));
    }
}

#[test]
fn percent_ignores_stray_signs() {
    assert_eq!(
        scalar_values(PlaceholderPattern::Percent, "50% off for %name%"),
        vec![string("50% off for "), placeholder("%name%", variable("name"))]
    );
    assert_eq!(scalar_values(PlaceholderPattern::Percent, "100%"), vec![string("100%")]);
}

#[test]
fn unterminated_placeholder_is_text() {
    assert_eq!(
        scalar_values(PlaceholderPattern::DoubleBrace, "open {{name"),
        vec![string("open {{name")]
    );
}

#[test]
fn empty_placeholder_is_literal() {
    assert_eq!(
        scalar_values(PlaceholderPattern::DoubleBrace, "{{}}"),
        vec![placeholder("{{}}", Placeholder::Literal(String::new()))]
    );
}

#[test]
fn placeholder_free_strings_are_literals() {
    let parser = Parser::new(PlaceholderPattern::DoubleBrace);
    let value = parse_json_str(r#"{"a": "plain", "b": [1, null], "c": "{{x}}"}"#).unwrap();
    let template = parser.parse(&value).unwrap();
    assert_eq!(template.kind, TemplateKind::Structured);

    let NodeTemplate::Map(map_templ) = &template.node else {
        panic!("expected a map template");
    };
    assert!(map_templ.has_placeholders);
    assert_eq!(map_templ.entries[0].value, NodeTemplate::Literal(Value::from("plain")));
    assert!(!map_templ.entries[1].value.has_placeholders());
    assert!(matches!(map_templ.entries[2].value, NodeTemplate::Scalar(_)));
    assert_eq!(template.node.to_value(), value);
}

#[test]
fn literal_only_strings_compile_to_literals() {
    let parser = Parser::new(PlaceholderPattern::DoubleBrace);
    let value = parse_json_str(r#"{"a": {"b": "{{}}"}, "c": ["{{ }}", "x"]}"#).unwrap();
    let template = parser.parse(&value).unwrap();
    assert!(!template.node.has_placeholders());
    assert_eq!(template.node.to_value(), value);

    let template = parser.parse_text("{{}} and {{name}}").unwrap();
    assert!(template.node.has_placeholders());
}

#[test]
fn text_templates() {
    let parser = Parser::new(PlaceholderPattern::DollarBrace);
    let template = parser.parse_text("# ${title}\n").unwrap();
    assert_eq!(template.kind, TemplateKind::Text);
    assert!(template.node.has_placeholders());
    assert_eq!(template.node.to_value(), Value::from("# ${title}\n"));
}

#[test]
fn invalid_placeholder_is_an_error() {
    let parser = Parser::new(PlaceholderPattern::DoubleBrace);
    let value = parse_json_str(r#"{"a": "{{|x.y}}"}"#).unwrap();
    assert!(matches!(parser.parse(&value), Err(MappingError::InvalidFormat(_))));
}

#[test]
fn pattern_names() {
    assert_eq!("mustache".parse::<PlaceholderPattern>().unwrap(), PlaceholderPattern::DoubleBrace);
    assert_eq!("${}".parse::<PlaceholderPattern>().unwrap(), PlaceholderPattern::DollarBrace);
    assert_eq!("Percent".parse::<PlaceholderPattern>().unwrap(), PlaceholderPattern::Percent);
    assert_eq!(PlaceholderPattern::SingleBrace.to_string(), "single-brace");
    assert!("angle".parse::<PlaceholderPattern>().is_err());
}
