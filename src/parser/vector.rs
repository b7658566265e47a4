use super::{preprocess_input, starts_with_word};
use crate::ir::{Vector, VectorField};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_AXIS: (f64, f64) = (-10.0, 10.0);

const NUM: &str = r"([+-]?[0-9]*\.?[0-9]+)";

static AXES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)axes\s*:\s*{NUM}\s*\.\.?\s*{NUM}\s*x\s*{NUM}\s*\.\.?\s*{NUM}"
    ))
    .unwrap()
});
static VEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)vec\s*\(\s*{NUM}\s*,\s*{NUM}\s*\)\s*->\s*\(\s*{NUM}\s*,\s*{NUM}\s*\)(?:\s*label\s*:\s*(.*))?"
    ))
    .unwrap()
});

/// Parses a vector diagram:
///
/// ```text
/// vector
/// axes: -5..5 x -5..5
/// vec (0,0) -> (3,4) label: v
/// ```
pub fn parse_vector_field(input: &str) -> VectorField {
    let mut field = VectorField {
        x_domain: DEFAULT_AXIS,
        y_domain: DEFAULT_AXIS,
        vectors: Vec::new(),
    };

    for line in preprocess_input(input) {
        if starts_with_word(&line.to_ascii_lowercase(), "vector") {
            continue;
        }
        if let Some(caps) = AXES_RE.captures(&line) {
            if let Some(range) = axis_range(&caps[1], &caps[2]) {
                field.x_domain = range;
            }
            if let Some(range) = axis_range(&caps[3], &caps[4]) {
                field.y_domain = range;
            }
            continue;
        }
        if let Some(caps) = VEC_RE.captures(&line) {
            let coords = [&caps[1], &caps[2], &caps[3], &caps[4]].map(parse_coordinate);
            let [Some(x0), Some(y0), Some(x1), Some(y1)] = coords else {
                continue;
            };
            let label = caps
                .get(5)
                .map(|m| m.as_str().trim().to_string())
                .filter(|label| !label.is_empty());
            field.vectors.push(Vector {
                from: (x0, y0),
                to: (x1, y1),
                label,
            });
        }
    }

    field
}

fn parse_coordinate(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn axis_range(lo: &str, hi: &str) -> Option<(f64, f64)> {
    let lo = parse_coordinate(lo)?;
    let hi = parse_coordinate(hi)?;
    (lo < hi).then_some((lo, hi))
}
