// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::cmp::Ordering;

use anyhow::{anyhow, Context, Error};
use clap::ArgMatches;
use frontmap::value::{parse_json_str, Value};

// A `--set` or `--set-json` override. Sorted by position on the command line
// so that later overrides win.
#[derive(Debug)]
pub struct VariableArg {
    pub index: usize,
    pub path: String,
    pub value: Value,
}

impl VariableArg {
    pub fn parse_string(index: usize, arg: &str) -> Result<VariableArg, Error> {
        let (path, value) = split_arg(arg)?;
        Ok(VariableArg {
            index,
            path: path.to_string(),
            value: Value::String(value.to_string()),
        })
    }

    pub fn parse_json(index: usize, arg: &str) -> Result<VariableArg, Error> {
        let (path, value) = split_arg(arg)?;
        let value = parse_json_str(value).with_context(|| format!("--set-json value for '{}'", path))?;
        Ok(VariableArg {
            index,
            path: path.to_string(),
            value,
        })
    }
}

fn split_arg(arg: &str) -> Result<(&str, &str), Error> {
    let (path, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PATH=VALUE, got '{}'", arg))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(anyhow!("missing path in '{}'", arg));
    }
    Ok((path, value))
}

/// Gathers `set` and `set_json` args in command line order.
pub fn collect_variable_args(matches: &ArgMatches) -> Result<Vec<VariableArg>, Error> {
    let mut args = Vec::new();

    if let (Some(values), Some(indices)) = (matches.get_many::<String>("set"), matches.indices_of("set")) {
        for (value, index) in values.zip(indices) {
            args.push(VariableArg::parse_string(index, value)?);
        }
    }

    if let (Some(values), Some(indices)) = (
        matches.get_many::<String>("set_json"),
        matches.indices_of("set_json"),
    ) {
        for (value, index) in values.zip(indices) {
            args.push(VariableArg::parse_json(index, value)?);
        }
    }

    args.sort();
    Ok(args)
}

impl PartialEq for VariableArg {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl PartialOrd for VariableArg {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VariableArg {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl Eq for VariableArg {}
