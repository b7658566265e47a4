//! SVG backends, one per visual family.
//!
//! All backends except chemistry are synchronous and produce a complete
//! `<svg>` document sized to the configured canvas. Element ids are prefixed
//! with a caller-supplied string so several diagrams can share a page.

mod chemistry;
mod markup;
mod node_link;
mod pie;
mod plot;
mod vector;

pub use chemistry::render_chemistry;
pub use markup::render_markup;
pub use node_link::render_node_link;
pub use pie::render_pie;
pub use plot::render_plot;
pub use vector::render_vector_field;

use crate::config::Config;
use crate::expr::ExprError;
use crate::ir::DiagramModel;
use crate::layout::apply_layout;
use crate::theme::Theme;

/// Failures a renderer reports instead of content.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A plot expression does not compile.
    #[error("cannot plot '{expression}': {source}")]
    Expression {
        expression: String,
        #[source]
        source: ExprError,
    },

    /// The chemistry block names no structure.
    #[error("no chemical structure given")]
    EmptyQuery,

    /// Chemistry needs the asynchronous depiction path.
    #[error("chemistry diagrams need a depiction service")]
    DepictionRequired,

    /// A newer render started on the same surface.
    #[error("render superseded by a newer request")]
    Superseded,
}

/// Renders every synchronous notation. Node-link models are laid out first.
pub fn render_svg(
    model: &mut DiagramModel,
    config: &Config,
    id_prefix: &str,
) -> Result<String, RenderError> {
    match model {
        DiagramModel::NodeLink(diagram)
        | DiagramModel::Sequence(diagram)
        | DiagramModel::Class(diagram) => {
            apply_layout(diagram, &config.canvas);
            Ok(render_node_link(diagram, config, id_prefix))
        }
        DiagramModel::Pie(chart) => Ok(render_pie(chart, config)),
        DiagramModel::Plot(plot) => render_plot(plot, config, id_prefix),
        DiagramModel::VectorField(field) => Ok(render_vector_field(field, config, id_prefix)),
        DiagramModel::RawMarkup(markup) => Ok(render_markup(markup)),
        DiagramModel::Chemistry(_) => Err(RenderError::DepictionRequired),
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn svg_open(width: f32, height: f32, theme: &Theme) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\"><rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    )
}

fn text_svg(x: f32, y: f32, text: &str, anchor: &str, size: f32, fill: &str, theme: &Theme) -> String {
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{size}\" fill=\"{fill}\">{}</text>",
        escape_xml(&theme.font_family),
        escape_xml(text)
    )
}

fn placeholder_svg(width: f32, height: f32, message: &str, theme: &Theme) -> String {
    let mut svg = svg_open(width, height, theme);
    svg.push_str(&text_svg(
        width / 2.0,
        height / 2.0,
        message,
        "middle",
        14.0,
        &theme.muted_text_color,
        theme,
    ));
    svg.push_str("</svg>");
    svg
}

/// Rough advance width; labels are short and the font is proportional.
fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.6
}

/// `12`, `2.5`, `0.33`: integers without a fraction, others to two places.
fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        return format!("{}", value.round() as i64);
    }
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// A 1-2-5 tick step giving roughly `target` ticks over `span`.
fn nice_step(span: f64, target: usize) -> f64 {
    if !(span.is_finite() && span > 0.0) {
        return 1.0;
    }
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

const MAX_TICKS: i64 = 1000;

/// Tick values inside `[lo, hi]` at multiples of the nice step. Empty when the
/// range cannot be divided into a bounded number of ticks.
fn ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 {
        return Vec::new();
    }
    let step = nice_step(span, target);
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }
    let first = (lo / step).ceil();
    let last = (hi / step).floor();
    if !first.is_finite() || !last.is_finite() || last - first > MAX_TICKS as f64 {
        return Vec::new();
    }
    let (first, last) = (first as i64, last as i64);
    (first..=last)
        .map(|idx| {
            let value = idx as f64 * step;
            if value.abs() < step * 1e-9 { 0.0 } else { value }
        })
        .collect()
}
