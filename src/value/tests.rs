use super::*;
use crate::error::MappingError;

#[test]
fn json_keeps_key_order_and_number_kinds() {
    let value = parse_json_str(r#"{"z": 1, "a": 2.5, "m": [true, null, "x"], "big": 18446744073709551615}"#).unwrap();
    let map = value.as_map().unwrap();
    assert_eq!(map.keys().map(String::as_str).collect::<Vec<_>>(), ["z", "a", "m", "big"]);
    assert_eq!(value.get("z"), Some(&Value::Integer(1)));
    assert_eq!(value.get("a"), Some(&Value::Real(2.5)));
    assert_eq!(
        value.get("m"),
        Some(&Value::Array(vec![Value::Boolean(true), Value::Null, Value::from("x")]))
    );
    assert!(matches!(value.get("big"), Some(Value::Real(_))));
}

#[test]
fn invalid_json_is_a_parse_error() {
    assert!(matches!(parse_json_str("{\"a\": "), Err(MappingError::ParseError(_))));
}

#[test]
fn json_serialization_follows_insertion_order() {
    let value = parse_json_str(r#"{"b": {"y": 1, "x": [1.5, "s"]}, "a": null}"#).unwrap();
    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        r#"{"b":{"y":1,"x":[1.5,"s"]},"a":null}"#
    );
}

#[test]
fn yaml_documents() {
    let docs = parse_yaml_str("title: Hello\ncount: 3\nratio: 0.5\ntags:\n  - a\n  - b\ndraft: false\nnone: ~\n").unwrap();
    assert_eq!(docs.len(), 1);
    let doc = &docs[0];
    assert_eq!(doc.get("title"), Some(&Value::from("Hello")));
    assert_eq!(doc.get("count"), Some(&Value::Integer(3)));
    assert_eq!(doc.get("ratio"), Some(&Value::Real(0.5)));
    assert_eq!(doc.get("tags"), Some(&Value::Array(vec![Value::from("a"), Value::from("b")])));
    assert_eq!(doc.get("draft"), Some(&Value::Boolean(false)));
    assert_eq!(doc.get("none"), Some(&Value::Null));
}

#[test]
fn front_matter() {
    let (header, body) = split_front_matter("---\ntitle: Hello\n---\n# Body\n");
    assert_eq!(header, Some("title: Hello\n"));
    assert_eq!(body, "# Body\n");

    let (header, body) = split_front_matter("# No header\n");
    assert_eq!(header, None);
    assert_eq!(body, "# No header\n");

    // Unterminated headers are left as body text.
    let (header, body) = split_front_matter("---\ntitle: Hello\n");
    assert_eq!(header, None);
    assert_eq!(body, "---\ntitle: Hello\n");
}

#[test]
fn truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Boolean(false).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(Value::from("no").is_truthy());
    assert!(Value::Integer(0).is_truthy());
    assert!(Value::Array(vec![]).is_truthy());
}

#[test]
fn display_strings() {
    assert_eq!(Value::Null.to_display_string(), "");
    assert_eq!(Value::Integer(-4).to_display_string(), "-4");
    assert_eq!(Value::Real(2.0).to_display_string(), "2.0");
    assert_eq!(Value::Real(0.25).to_display_string(), "0.25");
    assert_eq!(
        parse_json_str(r#"{"a": [1, "b"]}"#).unwrap().to_display_string(),
        r#"{"a":[1,"b"]}"#
    );
}

#[test]
fn set_path_creates_maps() {
    let mut value = Value::Null;
    assert!(value.set_path("meta.title", Value::from("T")));
    assert!(value.set_path("meta.count", Value::Integer(2)));
    assert_eq!(value, parse_json_str(r#"{"meta": {"title": "T", "count": 2}}"#).unwrap());

    assert!(!value.set_path("meta.title.x", Value::Null));
    assert!(!value.set_path("meta..x", Value::Null));
}
