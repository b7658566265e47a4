use super::{escape_xml, format_number, placeholder_svg, svg_open, text_svg};
use crate::config::Config;
use crate::ir::PieChart;
use std::f64::consts::{FRAC_PI_2, TAU};

const LEGEND_WIDTH: f32 = 220.0;
const TITLE_HEIGHT: f32 = 28.0;

/// Start and sweep angle (radians, clockwise from 12 o'clock) of every
/// slice. Slices without a positive value get a zero sweep.
pub(crate) fn slice_sweeps(chart: &PieChart) -> Vec<(f64, f64)> {
    let total: f64 = chart.slices.iter().map(|slice| slice.value.max(0.0)).sum();
    let mut start = 0.0;
    chart
        .slices
        .iter()
        .map(|slice| {
            let sweep = if total > 0.0 {
                slice.value.max(0.0) / total * TAU
            } else {
                0.0
            };
            let entry = (start, sweep);
            start += sweep;
            entry
        })
        .collect()
}

/// Draws a donut chart with a legend to its right.
pub fn render_pie(chart: &PieChart, config: &Config) -> String {
    let theme = &config.theme;
    let pie = &config.pie;
    let width = config.canvas.width;
    let height = config.canvas.height;

    let total: f64 = chart.slices.iter().map(|slice| slice.value.max(0.0)).sum();
    if !total.is_finite() || total <= 0.0 {
        return placeholder_svg(width, height, &pie.empty_text, theme);
    }

    let title_offset = if chart.title.is_some() { TITLE_HEIGHT } else { 0.0 };
    let cx = ((width - LEGEND_WIDTH) / 2.0).max(width / 4.0);
    let cy = (height + title_offset) / 2.0;
    let outer = ((cx.min(cy - title_offset)) - pie.margin).max(10.0);
    let inner = outer * pie.inner_radius_ratio.clamp(0.0, 0.95);

    let mut svg = svg_open(width, height, theme);
    if let Some(title) = &chart.title {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            width / 2.0,
            TITLE_HEIGHT,
            escape_xml(&theme.font_family),
            theme.font_size + 4.0,
            theme.primary_text_color,
            escape_xml(title)
        ));
    }

    svg.push_str("<g class=\"slices\">");
    for (idx, (slice, (start, sweep))) in chart.slices.iter().zip(slice_sweeps(chart)).enumerate() {
        if sweep <= 0.0 {
            continue;
        }
        let color = slice_color(config, idx);
        let percent = slice.value / total * 100.0;
        let tooltip = format!(
            "<title>{}: {} ({:.1}%)</title>",
            escape_xml(&slice.label),
            format_number(slice.value),
            percent
        );
        if sweep >= TAU - 1e-9 {
            svg.push_str(&full_ring(cx, cy, outer, inner, color, &pie.slice_stroke, &tooltip));
            continue;
        }
        let d = segment_path(cx as f64, cy as f64, outer as f64, inner as f64, start, sweep);
        svg.push_str(&format!(
            "<path class=\"slice\" d=\"{d}\" fill=\"{color}\" stroke=\"{}\" stroke-width=\"2\">{tooltip}</path>",
            pie.slice_stroke
        ));
    }
    svg.push_str("</g>");

    let legend_x = (cx + outer + 30.0).min(width - LEGEND_WIDTH + 10.0);
    let row_height = pie.legend_rect_size + pie.legend_spacing;
    let legend_height = row_height * chart.slices.len() as f32;
    let mut row_y = cy - legend_height / 2.0;
    svg.push_str("<g class=\"legend\">");
    for (idx, slice) in chart.slices.iter().enumerate() {
        let mut text = slice.label.clone();
        if chart.show_data {
            text.push_str(&format!(" [{}]", format_number(slice.value)));
        }
        if slice.estimated {
            text.push(' ');
            text.push_str(&pie.estimated_marker);
        }
        svg.push_str(&format!(
            "<rect x=\"{legend_x:.2}\" y=\"{row_y:.2}\" width=\"{0}\" height=\"{0}\" fill=\"{1}\"/>",
            pie.legend_rect_size,
            slice_color(config, idx)
        ));
        svg.push_str(&text_svg(
            legend_x + pie.legend_rect_size + 8.0,
            row_y + pie.legend_rect_size - 3.0,
            &text,
            "start",
            theme.font_size,
            &theme.primary_text_color,
            theme,
        ));
        row_y += row_height;
    }
    svg.push_str("</g></svg>");
    svg
}

fn slice_color(config: &Config, idx: usize) -> &str {
    let palette = &config.pie.palette;
    if palette.is_empty() {
        return "#999999";
    }
    &palette[idx % palette.len()]
}

fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    let theta = angle - FRAC_PI_2;
    (cx + radius * theta.cos(), cy + radius * theta.sin())
}

fn segment_path(cx: f64, cy: f64, outer: f64, inner: f64, start: f64, sweep: f64) -> String {
    let end = start + sweep;
    let large_arc = u8::from(sweep > std::f64::consts::PI);
    let (ox0, oy0) = polar(cx, cy, outer, start);
    let (ox1, oy1) = polar(cx, cy, outer, end);
    if inner <= 0.0 {
        return format!(
            "M {cx:.2} {cy:.2} L {ox0:.2} {oy0:.2} A {outer:.2} {outer:.2} 0 {large_arc} 1 {ox1:.2} {oy1:.2} Z"
        );
    }
    let (ix1, iy1) = polar(cx, cy, inner, end);
    let (ix0, iy0) = polar(cx, cy, inner, start);
    format!(
        "M {ox0:.2} {oy0:.2} A {outer:.2} {outer:.2} 0 {large_arc} 1 {ox1:.2} {oy1:.2} L {ix1:.2} {iy1:.2} A {inner:.2} {inner:.2} 0 {large_arc} 0 {ix0:.2} {iy0:.2} Z"
    )
}

fn full_ring(cx: f32, cy: f32, outer: f32, inner: f32, color: &str, stroke: &str, tooltip: &str) -> String {
    if inner <= 0.0 {
        return format!(
            "<circle class=\"slice\" cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{outer:.2}\" fill=\"{color}\" stroke=\"{stroke}\" stroke-width=\"2\">{tooltip}</circle>"
        );
    }
    let radius = (outer + inner) / 2.0;
    let band = outer - inner;
    format!(
        "<circle class=\"slice\" cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{band:.2}\">{tooltip}</circle>"
    )
}
