use super::{hash_seed, parse_leading_number, preprocess_input, starts_with_word, strip_quotes};
use crate::ir::{PieChart, PieSlice};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound (exclusive) of the placeholder used for unreadable values.
pub const PLACEHOLDER_MAX: f64 = 100.0;

pub fn parse_pie(input: &str) -> PieChart {
    let mut chart = PieChart::default();

    for line in preprocess_input(input) {
        let lower = line.to_ascii_lowercase();
        if starts_with_word(&lower, "pie") {
            if lower.contains("showdata") {
                chart.show_data = true;
            }
            if let Some(title_pos) = lower.find("title") {
                let title = line.get(title_pos + "title".len()..).unwrap_or("").trim();
                if !title.is_empty() {
                    chart.title = Some(title.to_string());
                }
            }
            continue;
        }
        if starts_with_word(&lower, "showdata") {
            chart.show_data = true;
            continue;
        }
        if starts_with_word(&lower, "title") {
            let title = line.get("title".len()..).unwrap_or("").trim();
            if !title.is_empty() {
                chart.title = Some(title.to_string());
            }
            continue;
        }
        if let Some(slice) = parse_slice_line(&line) {
            chart.slices.push(slice);
        }
    }

    chart
}

fn parse_slice_line(line: &str) -> Option<PieSlice> {
    let mut parts = line.split(':');
    let label = strip_quotes(parts.next()?);
    let value_text = parts.next()?.trim();
    if label.is_empty() || value_text.is_empty() {
        return None;
    }
    let slice = match parse_leading_number(value_text) {
        Some(value) => PieSlice {
            label,
            value,
            estimated: false,
        },
        None => PieSlice {
            label,
            value: placeholder_value(line),
            estimated: true,
        },
    };
    Some(slice)
}

/// Stand-in for a value that could not be read. Seeded from the line so a
/// given source always parses to the same chart.
fn placeholder_value(line: &str) -> f64 {
    let mut rng = StdRng::seed_from_u64(hash_seed(line));
    rng.random_range(0.0..PLACEHOLDER_MAX)
}
