use super::{preprocess_input, starts_with_word};
use crate::ir::PlotSpec;
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_DOMAIN: (f64, f64) = (-10.0, 10.0);
pub const DEFAULT_EXPRESSION: &str = "sin(x)";

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)domain\s*:\s*([+-]?[0-9]*\.?[0-9]+)\s*\.\.?\s*([+-]?[0-9]*\.?[0-9]+)")
        .unwrap()
});
static FUNCTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]\w*\s*\(\s*x\s*\)\s*=\s*(.+)$").unwrap());

/// Parses a function plot:
///
/// ```text
/// plot
/// f(x) = sin(x)
/// g(x) = x^2 - 4
/// domain: -10..10
/// ```
pub fn parse_plot(input: &str) -> PlotSpec {
    let mut domain: Option<(f64, f64)> = None;
    let mut expressions = Vec::new();

    for line in preprocess_input(input) {
        let lower = line.to_ascii_lowercase();
        if starts_with_word(&lower, "plot") || starts_with_word(&lower, "math") {
            continue;
        }
        if let Some(caps) = DOMAIN_RE.captures(&line) {
            if domain.is_none() {
                if let (Some(lo), Some(hi)) = (parse_bound(&caps[1]), parse_bound(&caps[2])) {
                    if lo < hi {
                        domain = Some((lo, hi));
                    }
                }
            }
            continue;
        }
        if let Some(caps) = FUNCTION_RE.captures(&line) {
            expressions.push(caps[1].trim().to_string());
            continue;
        }
        if !line.contains('=') {
            expressions.push(line);
        }
    }

    if expressions.is_empty() {
        expressions.push(DEFAULT_EXPRESSION.to_string());
    }

    PlotSpec {
        expressions,
        domain: domain.unwrap_or(DEFAULT_DOMAIN),
    }
}

fn parse_bound(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}
