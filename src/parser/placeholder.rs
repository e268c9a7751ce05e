// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

#[cfg(test)]
mod tests;

use chumsky::prelude::*;

use crate::{ast::Placeholder, error::MappingError};

pub struct PlaceholderParser {
    parser: Box<dyn Parser<char, Placeholder, Error = Simple<char>>>,
}

impl PlaceholderParser {
    pub fn new() -> PlaceholderParser {
        let parser = gen_placeholder_parser();
        PlaceholderParser {
            parser: Box::new(parser),
        }
    }

    /// Parses the text found between a pair of delimiters.
    ///
    /// Empty content and empty variable names come back as `Placeholder::Literal`.
    /// A path variable with an empty path is an `InvalidFormat` error.
    pub fn parse(&self, content: &str) -> Result<Placeholder, MappingError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Placeholder::Literal(content.to_string()));
        }

        let res = self.parser.parse(trimmed);
        let placeholder = match res {
            Ok(placeholder) => placeholder,
            Err(errs) => {
                let messages = errs.iter().map(|err| err.to_string()).collect::<Vec<_>>();
                return Err(MappingError::InvalidFormat(format!(
                    "placeholder '{}': {}",
                    content,
                    messages.join("; ")
                )));
            }
        };

        match placeholder {
            Placeholder::SimpleVariable { name, .. } if name.is_empty() => Ok(Placeholder::Literal(content.to_string())),
            placeholder => Ok(placeholder),
        }
    }
}

impl Default for PlaceholderParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Total form of `PlaceholderParser::parse`: anything unparseable is a literal.
pub fn parse_placeholder(content: &str) -> Placeholder {
    PlaceholderParser::new()
        .parse(content)
        .unwrap_or_else(|_| Placeholder::Literal(content.to_string()))
}

fn gen_placeholder_parser() -> impl Parser<char, Placeholder, Error = Simple<char>> {
    let array_expansion = just("@items").then_ignore(end()).to(Placeholder::ArrayExpansion);

    let file_reference = just("@file:")
        .ignore_then(any().repeated().at_least(1).collect::<String>())
        .then_ignore(end())
        .map(|path| Placeholder::FileReference {
            path: path.trim().to_string(),
        });

    // The first '?' must come before the first ':'.
    let conditional = filter(|c: &char| *c != '?' && *c != ':')
        .repeated()
        .collect::<String>()
        .then_ignore(just('?'))
        .then(filter(|c: &char| *c != ':').repeated().collect::<String>())
        .then_ignore(just(':'))
        .then(any().repeated().collect::<String>())
        .then_ignore(end())
        .map(|((condition, when_true), when_false)| Placeholder::Conditional {
            condition: condition.trim().to_string(),
            when_true: when_true.trim().to_string(),
            when_false: when_false.trim().to_string(),
        });

    let escaped_pipe = just('\\').ignore_then(just('|'));
    let name = escaped_pipe
        .or(filter(|c: &char| *c != '|'))
        .repeated()
        .collect::<String>();
    let default = just('|').ignore_then(any().repeated().collect::<String>());

    let variable = name
        .then(default.or_not())
        .then_ignore(end())
        .try_map(|(name, default), span| {
            let is_path = name.contains('.') || default.as_ref().is_some_and(|default| default.contains('.'));
            let name = name.trim().to_string();
            let default = default.map(|default| default.trim().to_string());
            if !is_path {
                return Ok(Placeholder::SimpleVariable { name, default });
            }
            if name.is_empty() {
                return Err(Simple::custom(span, "path variable has an empty path"));
            }
            Ok(Placeholder::PathVariable { path: name, default })
        });

    array_expansion.or(file_reference).or(conditional).or(variable)
}
