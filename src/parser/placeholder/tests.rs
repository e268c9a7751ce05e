use std::{fs, path::Path};

use super::*;

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
    array_expansion_prefix,
    conditional,
    conditional_empty_branch,
    default_with_dot,
    empty,
    escaped_pipe,
    file_reference,
    path_variable,
    path_with_brackets,
    simple_variable,
    simple_with_whitespace,
    variable_with_default,
    variable_with_empty_default,
}

#[test]
fn empty_path_is_invalid() {
    let parser = PlaceholderParser::new();
    let res = parser.parse("|fallback.txt");
    assert!(matches!(res, Err(MappingError::InvalidFormat(_))), "{:?}", res);
}

#[test]
fn total_parse_never_fails() {
    assert_eq!(
        parse_placeholder("|fallback.txt"),
        Placeholder::Literal("|fallback.txt".to_string())
    );
    assert_eq!(parse_placeholder(""), Placeholder::Literal(String::new()));
    assert_eq!(
        parse_placeholder("name"),
        Placeholder::SimpleVariable {
            name: "name".to_string(),
            default: None
        }
    );
}

#[test]
fn empty_name_with_default_is_literal() {
    let parser = PlaceholderParser::new();
    assert_eq!(parser.parse("|x").unwrap(), Placeholder::Literal("|x".to_string()));
}

fn run_test(name: &str) {
    let rootdir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let test_data_dir = rootdir.join("src/parser/placeholder/tests/testdata");

    let test_file = test_data_dir.join(format!("tests/{}.txt", name));
    let expected_file = test_data_dir.join(format!("expected/{}.txt", name));
    let actual_dir = test_data_dir.join("actual");
    let actual_file = actual_dir.join(format!("{}.txt", name));

    let test = fs::read_to_string(test_file).unwrap();

    let parser = PlaceholderParser::new();
    let result = parser.parse(&test);
    let actual = format_result(result);

    fs::create_dir_all(actual_dir).unwrap();
    fs::write(actual_file, &actual).unwrap();

    let expected = fs::read_to_string(expected_file).unwrap();
    assert_eq!(expected, actual);
}

fn format_result(result: Result<Placeholder, MappingError>) -> String {
    let mut string = String::new();

    string.push_str("ERROR: ");

    let placeholder = match result {
        Ok(placeholder) => placeholder,
        Err(err) => {
            string.push_str(&err.to_string());
            return string;
        }
    };

    string.push_str("<None>\n");
    string.push_str("OUT:\n");
    string.push_str(&format!("{:?}\n", placeholder));
    string
}
