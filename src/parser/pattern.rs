// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::error::MappingError;

/// Delimiter convention used to find placeholders in template strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderPattern {
    /// `{{name}}`
    #[default]
    DoubleBrace,
    /// `${name}`
    DollarBrace,
    /// `%name%`
    Percent,
    /// `{name}`, never matching inside `{{...}}`
    SingleBrace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternMatch<'a> {
    pub start: usize,
    pub end: usize,
    pub content: &'a str,
}

impl PlaceholderPattern {
    pub fn delimiters(&self) -> (&'static str, &'static str) {
        match self {
            PlaceholderPattern::DoubleBrace => ("{{", "}}"),
            PlaceholderPattern::DollarBrace => ("${", "}"),
            PlaceholderPattern::Percent => ("%", "%"),
            PlaceholderPattern::SingleBrace => ("{", "}"),
        }
    }

    /// Finds the next placeholder at or after byte offset `from`.
    pub fn find<'a>(&self, text: &'a str, from: usize) -> Option<PatternMatch<'a>> {
        match self {
            PlaceholderPattern::DoubleBrace | PlaceholderPattern::DollarBrace => {
                let (open, close) = self.delimiters();
                let start = from + text.get(from..)?.find(open)?;
                let content_start = start + open.len();
                let content_end = content_start + text[content_start..].find(close)?;
                Some(PatternMatch {
                    start,
                    end: content_end + close.len(),
                    content: &text[content_start..content_end],
                })
            }
            PlaceholderPattern::Percent => Self::find_percent(text, from),
            PlaceholderPattern::SingleBrace => Self::find_single_brace(text, from),
        }
    }

    fn find_percent(text: &str, from: usize) -> Option<PatternMatch<'_>> {
        let mut curr_index = from;
        loop {
            let start = curr_index + text.get(curr_index..)?.find('%')?;
            let content_start = start + 1;
            let content_end = content_start + text[content_start..].find('%')?;
            let content = &text[content_start..content_end];

            // Stray percent signs ("50% off") are literal text.
            let valid = !content.is_empty()
                && !content.contains('\n')
                && !content.starts_with(char::is_whitespace)
                && !content.ends_with(char::is_whitespace);
            if valid {
                return Some(PatternMatch {
                    start,
                    end: content_end + 1,
                    content,
                });
            }
            curr_index = content_start;
        }
    }

    fn find_single_brace(text: &str, from: usize) -> Option<PatternMatch<'_>> {
        let bytes = text.as_bytes();
        let mut curr_index = from;
        loop {
            let start = curr_index + text.get(curr_index..)?.find('{')?;
            let doubled = (start > 0 && bytes[start - 1] == b'{') || bytes.get(start + 1) == Some(&b'{');
            if doubled {
                curr_index = start + 1;
                continue;
            }

            let content_start = start + 1;
            let rel = text[content_start..].find(|c: char| c == '{' || c == '}')?;
            let close = content_start + rel;
            if bytes[close] == b'{' {
                curr_index = close;
                continue;
            }
            if rel == 0 || bytes.get(close + 1) == Some(&b'}') {
                curr_index = close + 1;
                continue;
            }
            return Some(PatternMatch {
                start,
                end: close + 1,
                content: &text[content_start..close],
            });
        }
    }
}

impl FromStr for PlaceholderPattern {
    type Err = MappingError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "double-brace" | "mustache" | "{{}}" => Ok(PlaceholderPattern::DoubleBrace),
            "dollar-brace" | "${}" => Ok(PlaceholderPattern::DollarBrace),
            "percent" | "%%" => Ok(PlaceholderPattern::Percent),
            "single-brace" | "{}" => Ok(PlaceholderPattern::SingleBrace),
            other => Err(MappingError::InvalidFormat(format!("unknown placeholder pattern '{}'", other))),
        }
    }
}

impl fmt::Display for PlaceholderPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PlaceholderPattern::DoubleBrace => "double-brace",
            PlaceholderPattern::DollarBrace => "dollar-brace",
            PlaceholderPattern::Percent => "percent",
            PlaceholderPattern::SingleBrace => "single-brace",
        };
        f.write_str(name)
    }
}
