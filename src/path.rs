// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Dot/bracket path lookup over `Value` trees.

use std::borrow::Cow;

use crate::value::Value;

/// Splits `a.b[0].c` into `["a", "b", "0", "c"]`.
///
/// Returns `None` for malformed paths (empty segments, unbalanced brackets).
pub fn split_path(path: &str) -> Option<Vec<&str>> {
    if path.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let (head, mut rest) = match part.find('[') {
            Some(index) => (&part[..index], &part[index..]),
            None => (part, ""),
        };
        if !head.is_empty() {
            segments.push(head);
        } else if rest.is_empty() {
            return None;
        }
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let index = &inner[..close];
            if index.is_empty() {
                return None;
            }
            segments.push(index);
            rest = &inner[close + 1..];
        }
    }
    Some(segments)
}

/// Resolves `path` against `root`. Exact keys and exact indices only; the
/// segment `length` on a list yields its size.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    let segments = split_path(path)?;
    resolve_segments(root, &segments)
}

pub fn resolve_segments<'a>(root: &'a Value, segments: &[&str]) -> Option<Cow<'a, Value>> {
    let mut current = root;
    for (position, segment) in segments.iter().enumerate() {
        match current {
            Value::Map(map) => {
                current = map.get(*segment)?;
            }
            Value::Array(items) => {
                if *segment == "length" {
                    // Nothing can follow a length.
                    if position + 1 != segments.len() {
                        return None;
                    }
                    return Some(Cow::Owned(Value::Integer(items.len() as i64)));
                }
                current = items.get(parse_index(segment)?)?;
            }
            _ => return None,
        }
    }
    Some(Cow::Borrowed(current))
}

pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::parse_json_str;

    fn data() -> Value {
        parse_json_str(r#"{"a": {"b": {"c": 42}}, "list": [10, {"x": "y"}], "n": null}"#).unwrap()
    }

    #[test]
    fn resolves_nested_keys() {
        let data = data();
        assert_eq!(resolve(&data, "a.b.c").unwrap().into_owned(), Value::Integer(42));
    }

    #[test]
    fn resolves_indices_with_dots_and_brackets() {
        let data = data();
        assert_eq!(resolve(&data, "list.0").unwrap().into_owned(), Value::Integer(10));
        assert_eq!(resolve(&data, "list[1].x").unwrap().into_owned(), Value::from("y"));
    }

    #[test]
    fn list_length() {
        let data = data();
        assert_eq!(resolve(&data, "list.length").unwrap().into_owned(), Value::Integer(2));
        assert!(resolve(&data, "list.length.x").is_none());
    }

    #[test]
    fn missing_and_out_of_bounds() {
        let data = data();
        assert!(resolve(&data, "a.x").is_none());
        assert!(resolve(&data, "list.2").is_none());
        assert!(resolve(&data, "list.-1").is_none());
        assert!(resolve(&data, "list.+1").is_none());
    }

    #[test]
    fn scalars_cannot_be_indexed() {
        let data = data();
        assert!(resolve(&data, "a.b.c.d").is_none());
        assert!(resolve(&data, "n.x").is_none());
    }

    #[test]
    fn null_value_is_found() {
        let data = data();
        assert_eq!(resolve(&data, "n").unwrap().into_owned(), Value::Null);
    }

    #[test]
    fn malformed_paths() {
        assert_eq!(split_path(""), None);
        assert_eq!(split_path("a..b"), None);
        assert_eq!(split_path("a[0"), None);
        assert_eq!(split_path("a[]"), None);
        assert_eq!(split_path("a[0][1].b"), Some(vec!["a", "0", "1", "b"]));
    }
}
