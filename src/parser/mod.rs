//! Per-notation parsers.
//!
//! Every parser is total: malformed lines are skipped one at a time and the
//! result is always a model, falling back to empty or default fields.

mod chemistry;
mod class;
mod flowchart;
mod markup;
mod pie;
mod plot;
mod sequence;
mod vector;

pub use chemistry::parse_chemistry;
pub use class::parse_class_diagram;
pub use flowchart::parse_flowchart;
pub use markup::{parse_markup, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
pub use pie::parse_pie;
pub use plot::{parse_plot, DEFAULT_DOMAIN, DEFAULT_EXPRESSION};
pub use sequence::parse_sequence_diagram;
pub use vector::{parse_vector_field, DEFAULT_AXIS};

use crate::classify::classify;
use crate::ir::{DiagramModel, NotationTag};

/// Classifies `input` and parses it with the matching notation parser.
pub fn parse_diagram(input: &str) -> DiagramModel {
    parse_as(classify(input), input)
}

/// Parses `input` as the given notation, bypassing classification.
pub fn parse_as(tag: NotationTag, input: &str) -> DiagramModel {
    match tag {
        NotationTag::NodeLink => DiagramModel::NodeLink(parse_flowchart(input)),
        NotationTag::Sequence => DiagramModel::Sequence(parse_sequence_diagram(input)),
        NotationTag::Class => DiagramModel::Class(parse_class_diagram(input)),
        NotationTag::Pie => DiagramModel::Pie(parse_pie(input)),
        NotationTag::Plot => DiagramModel::Plot(parse_plot(input)),
        NotationTag::VectorField => DiagramModel::VectorField(parse_vector_field(input)),
        NotationTag::Chemistry => DiagramModel::Chemistry(parse_chemistry(input)),
        NotationTag::RawMarkup => DiagramModel::RawMarkup(parse_markup(input)),
    }
}

/// Trimmed lines with blank lines, `%%` comment lines and trailing `%%`
/// comments removed.
fn preprocess_input(input: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in input.lines() {
        let trimmed_line = raw_line.trim();
        if trimmed_line.is_empty() || trimmed_line.starts_with("%%") {
            continue;
        }
        let without_comment = strip_trailing_comment(trimmed_line);
        if without_comment.is_empty() {
            continue;
        }
        lines.push(without_comment);
    }
    lines
}

fn strip_trailing_comment(line: &str) -> String {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            out.push(ch);
            continue;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            out.push(ch);
            continue;
        }
        if ch == '%' && chars.peek() == Some(&'%') {
            break;
        }
        out.push(ch);
    }
    out.trim().to_string()
}

/// Splits a line on `;` outside quotes and brackets.
fn split_statements(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' | '(' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ']' | ')' | '}' => {
                depth = (depth - 1).max(0);
                current.push(ch);
            }
            ';' if depth == 0 => {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
    parts
}

/// Removes every quote character from a label.
fn strip_quotes(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|ch| *ch != '"' && *ch != '\'')
        .collect()
}

/// `true` when `line` starts with `word` followed by a non-word character or
/// the end of the line.
fn starts_with_word(line: &str, word: &str) -> bool {
    line.starts_with(word)
        && line[word.len()..]
            .chars()
            .next()
            .is_none_or(|ch| !ch.is_alphanumeric() && ch != '_')
}

/// Parses the longest leading decimal number of `input`, the way a lenient
/// float reader does (`"12px"` is 12, `"abc"` is nothing).
fn parse_leading_number(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || mantissa_digits > 0 {
            mantissa_digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

fn hash_seed(input: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    input.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_drops_comments_and_blanks() {
        let lines = preprocess_input("graph LR\n\n%% note\n  A --> B %% trailing\n");
        assert_eq!(lines, vec!["graph LR".to_string(), "A --> B".to_string()]);
    }

    #[test]
    fn trailing_comment_inside_quotes_is_kept() {
        assert_eq!(strip_trailing_comment("A[\"50%% off\"]"), "A[\"50%% off\"]");
    }

    #[test]
    fn split_statements_respects_brackets() {
        assert_eq!(
            split_statements("A[x;y] --> B; B --> C"),
            vec!["A[x;y] --> B".to_string(), "B --> C".to_string()]
        );
    }

    #[test]
    fn word_prefix_needs_a_boundary() {
        assert!(starts_with_word("pie", "pie"));
        assert!(starts_with_word("pie showdata", "pie"));
        assert!(!starts_with_word("pies: 3", "pie"));
        assert!(!starts_with_word("pi", "pie"));
    }

    #[test]
    fn leading_number_is_lenient() {
        assert_eq!(parse_leading_number("10"), Some(10.0));
        assert_eq!(parse_leading_number(" -2.5kg"), Some(-2.5));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("1e3"), Some(1000.0));
        assert_eq!(parse_leading_number("4e"), Some(4.0));
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number("-"), None);
        assert_eq!(parse_leading_number("."), None);
    }

    #[test]
    fn parse_diagram_routes_by_notation() {
        assert_eq!(parse_diagram("pie\nA: 1").tag(), NotationTag::Pie);
        assert_eq!(parse_diagram("chem\nwater").tag(), NotationTag::Chemistry);
        assert_eq!(parse_diagram("A --> B").tag(), NotationTag::NodeLink);
    }
}
