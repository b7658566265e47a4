use super::{RenderError, format_number, svg_open, text_svg, ticks};
use crate::config::Config;
use crate::expr::Expression;
use crate::ir::PlotSpec;

/// Linear map from the plot domain to canvas coordinates.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn sx(&self, x: f64) -> f64 {
        self.left + (x - self.x_min) / (self.x_max - self.x_min) * self.width
    }

    fn sy(&self, y: f64) -> f64 {
        self.top + (self.y_max - y) / (self.y_max - self.y_min) * self.height
    }
}

/// Samples every expression over the domain and draws it as a polyline.
/// The y-range is centred on zero with the canvas aspect ratio.
pub fn render_plot(plot: &PlotSpec, config: &Config, id_prefix: &str) -> Result<String, RenderError> {
    let expressions = plot
        .expressions
        .iter()
        .map(|source| {
            Expression::compile(source).map_err(|source_err| RenderError::Expression {
                expression: source.clone(),
                source: source_err,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let theme = &config.theme;
    let style = &config.plot;
    let width = config.canvas.width;
    let height = config.canvas.height;
    let padding = style.padding as f64;

    let (x_min, x_max) = plot.domain;
    let plot_width = (width as f64 - 2.0 * padding).max(1.0);
    let plot_height = (height as f64 - 2.0 * padding).max(1.0);
    let y_half = (x_max - x_min) / 2.0 * plot_height / plot_width;
    let frame = Frame {
        x_min,
        x_max,
        y_min: -y_half,
        y_max: y_half,
        left: padding,
        top: padding,
        width: plot_width,
        height: plot_height,
    };

    let clip_id = format!("{id_prefix}-plot-clip");
    let mut svg = svg_open(width, height, theme);
    svg.push_str(&format!(
        "<defs><clipPath id=\"{clip_id}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"/></clipPath></defs>",
        frame.left, frame.top, frame.width, frame.height
    ));
    svg.push_str(&axes(&frame, config));

    svg.push_str(&format!("<g class=\"curves\" clip-path=\"url(#{clip_id})\">"));
    for (idx, expression) in expressions.iter().enumerate() {
        let color = curve_color(config, idx);
        for segment in sample_segments(expression, &frame, style.samples) {
            let mut d = String::new();
            for (point_idx, (px, py)) in segment.iter().enumerate() {
                let command = if point_idx == 0 { "M" } else { " L" };
                d.push_str(&format!("{command} {px:.2} {py:.2}"));
            }
            svg.push_str(&format!(
                "<path class=\"curve\" d=\"{d}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{}\"/>",
                style.stroke_width
            ));
        }
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"legend\">");
    for (idx, expression) in expressions.iter().enumerate() {
        let y = frame.top as f32 + 16.0 + idx as f32 * (theme.font_size + 6.0);
        svg.push_str(&text_svg(
            frame.left as f32 + 10.0,
            y,
            &format!("y = {}", expression.source()),
            "start",
            theme.font_size,
            curve_color(config, idx),
            theme,
        ));
    }
    svg.push_str("</g></svg>");
    Ok(svg)
}

fn curve_color(config: &Config, idx: usize) -> &str {
    let colors = &config.plot.colors;
    if colors.is_empty() {
        return config.theme.accent_color.as_str();
    }
    &colors[idx % colors.len()]
}

/// Canvas-space polylines for `expression`. A curve is split wherever the
/// value is not finite, leaves the visible band by a wide margin, or jumps
/// by more than the plot height between neighbouring samples.
fn sample_segments(expression: &Expression, frame: &Frame, samples: usize) -> Vec<Vec<(f64, f64)>> {
    let samples = samples.max(2);
    let y_span = frame.y_max - frame.y_min;
    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for idx in 0..=samples {
        let x = frame.x_min + (frame.x_max - frame.x_min) * idx as f64 / samples as f64;
        let y = expression.eval(x);
        let visible = y.is_finite() && y < frame.y_max + y_span * 4.0 && y > frame.y_min - y_span * 4.0;
        if !visible {
            flush(&mut current, &mut segments);
            continue;
        }
        let point = (frame.sx(x), frame.sy(y));
        if let Some(&(_, prev_y)) = current.last() {
            if (point.1 - prev_y).abs() > frame.height {
                flush(&mut current, &mut segments);
            }
        }
        current.push(point);
    }
    flush(&mut current, &mut segments);
    segments
}

fn flush(current: &mut Vec<(f64, f64)>, segments: &mut Vec<Vec<(f64, f64)>>) {
    if current.len() >= 2 {
        segments.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

fn axes(frame: &Frame, config: &Config) -> String {
    let theme = &config.theme;
    let tick_count = config.plot.tick_count;
    let axis_x = frame.sx(0.0_f64.clamp(frame.x_min, frame.x_max));
    let axis_y = frame.sy(0.0_f64.clamp(frame.y_min, frame.y_max));
    let right = frame.left + frame.width;
    let bottom = frame.top + frame.height;
    let label_size = (theme.font_size - 2.0).max(8.0);

    let mut svg = String::from("<g class=\"axes\">");
    svg.push_str(&format!(
        "<line x1=\"{left:.2}\" y1=\"{axis_y:.2}\" x2=\"{right:.2}\" y2=\"{axis_y:.2}\" stroke=\"{color}\"/><line x1=\"{axis_x:.2}\" y1=\"{top:.2}\" x2=\"{axis_x:.2}\" y2=\"{bottom:.2}\" stroke=\"{color}\"/>",
        left = frame.left,
        top = frame.top,
        color = theme.axis_color,
    ));
    for value in ticks(frame.x_min, frame.x_max, tick_count) {
        let x = frame.sx(value);
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\"/>",
            axis_y - 4.0,
            axis_y + 4.0,
            theme.axis_color
        ));
        if value != 0.0 {
            svg.push_str(&text_svg(
                x as f32,
                (axis_y + 16.0) as f32,
                &format_number(value),
                "middle",
                label_size,
                &theme.muted_text_color,
                theme,
            ));
        }
    }
    for value in ticks(frame.y_min, frame.y_max, tick_count) {
        let y = frame.sy(value);
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"{}\"/>",
            axis_x - 4.0,
            axis_x + 4.0,
            theme.axis_color
        ));
        if value != 0.0 {
            svg.push_str(&text_svg(
                (axis_x - 8.0) as f32,
                (y + 4.0) as f32,
                &format_number(value),
                "end",
                label_size,
                &theme.muted_text_color,
                theme,
            ));
        }
    }
    svg.push_str("</g>");
    svg
}
