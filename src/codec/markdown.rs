// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::value::{Map, Value};

const TOP_HEADING: usize = 2;
const MAX_HEADING: usize = 6;

pub fn encode(value: &Value) -> String {
    let mut lines = Vec::new();
    write_value(&mut lines, value, TOP_HEADING, false);
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

// `nested` is set inside list items, where headings would break the list.
fn write_value(lines: &mut Vec<String>, value: &Value, level: usize, nested: bool) {
    match value {
        Value::Map(map) => write_map(lines, map, level, nested),
        Value::Array(items) => write_list(lines, items, level),
        scalar => push_text(lines, "", &scalar.to_display_string(), ""),
    }
}

fn write_map(lines: &mut Vec<String>, map: &Map, level: usize, nested: bool) {
    for (key, value) in map {
        if !is_block(value) {
            push_text(lines, &format!("**{}**: ", key), &value.to_display_string(), "  ");
        } else if !nested && level <= MAX_HEADING {
            blank_line(lines);
            lines.push(format!("{} {}", "#".repeat(level), key));
            lines.push(String::new());
            write_value(lines, value, level + 1, false);
            blank_line(lines);
        } else {
            lines.push(format!("**{}**:", key));
            let mut sub = Vec::new();
            write_value(&mut sub, value, level, true);
            lines.extend(sub.iter().map(|line| indent(line, "  ")));
        }
    }
}

fn write_list(lines: &mut Vec<String>, items: &[Value], level: usize) {
    for (index, item) in items.iter().enumerate() {
        let marker = format!("{}. ", index + 1);
        let pad = " ".repeat(marker.len());
        if !is_block(item) {
            push_text(lines, &marker, &item.to_display_string(), &pad);
            continue;
        }

        let mut sub = Vec::new();
        write_value(&mut sub, item, level, true);
        for (position, line) in sub.iter().enumerate() {
            if position == 0 {
                lines.push(format!("{}{}", marker, line));
            } else {
                lines.push(indent(line, &pad));
            }
        }
    }
}

// Continuation lines of multi-line text are indented under the first line.
fn push_text(lines: &mut Vec<String>, prefix: &str, text: &str, pad: &str) {
    let mut text_lines = text.lines();
    let first = text_lines.next().unwrap_or_default();
    lines.push(format!("{}{}", prefix, first).trim_end().to_string());
    for line in text_lines {
        lines.push(indent(line.trim_end(), pad));
    }
}

fn is_block(value: &Value) -> bool {
    match value {
        Value::Map(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn blank_line(lines: &mut Vec<String>) {
    if lines.last().is_some_and(|line| !line.is_empty()) {
        lines.push(String::new());
    }
}

fn indent(line: &str, pad: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{}{}", pad, line)
    }
}
