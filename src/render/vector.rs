use super::{format_number, svg_open, text_svg, ticks};
use crate::config::Config;
use crate::ir::VectorField;

#[derive(Debug, Clone, Copy)]
struct Axes {
    x_domain: (f64, f64),
    y_domain: (f64, f64),
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Axes {
    fn sx(&self, x: f64) -> f64 {
        let (lo, hi) = self.x_domain;
        self.left + (x - lo) / (hi - lo) * (self.right - self.left)
    }

    fn sy(&self, y: f64) -> f64 {
        let (lo, hi) = self.y_domain;
        self.bottom - (y - lo) / (hi - lo) * (self.bottom - self.top)
    }
}

/// Draws each vector as an arrow over a pair of axes crossing at the origin
/// (or the nearest domain edge).
pub fn render_vector_field(field: &VectorField, config: &Config, id_prefix: &str) -> String {
    let theme = &config.theme;
    let style = &config.vector;
    let width = config.canvas.width;
    let height = config.canvas.height;

    let axes = Axes {
        x_domain: field.x_domain,
        y_domain: field.y_domain,
        left: style.margin_left as f64,
        right: (width - style.margin_right) as f64,
        top: style.margin_top as f64,
        bottom: (height - style.margin_bottom) as f64,
    };

    let marker_id = format!("{id_prefix}-vec-arrow");
    let mut svg = svg_open(width, height, theme);
    svg.push_str(&format!(
        "<defs><marker id=\"{marker_id}\" viewBox=\"0 0 10 10\" refX=\"6\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker></defs>",
        theme.accent_color
    ));
    svg.push_str(&axis_lines(&axes, config));

    svg.push_str("<g class=\"vectors\">");
    for vector in &field.vectors {
        let (x1, y1) = (axes.sx(vector.from.0), axes.sy(vector.from.1));
        let (x2, y2) = (axes.sx(vector.to.0), axes.sy(vector.to.1));
        svg.push_str(&format!(
            "<line class=\"vector\" x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{}\" stroke-width=\"{}\" marker-end=\"url(#{marker_id})\"/>",
            theme.accent_color, style.stroke_width
        ));
        if let Some(label) = vector.label.as_deref() {
            let offset = style.label_offset as f64;
            svg.push_str(&text_svg(
                (x2 + offset) as f32,
                (y2 - offset) as f32,
                label,
                "start",
                theme.font_size,
                &theme.primary_text_color,
                theme,
            ));
        }
    }
    svg.push_str("</g></svg>");
    svg
}

fn axis_lines(axes: &Axes, config: &Config) -> String {
    let theme = &config.theme;
    let tick_count = config.vector.tick_count;
    let origin_x = axes.sx(0.0_f64.clamp(axes.x_domain.0, axes.x_domain.1));
    let origin_y = axes.sy(0.0_f64.clamp(axes.y_domain.0, axes.y_domain.1));
    let label_size = (theme.font_size - 2.0).max(8.0);

    let mut svg = String::from("<g class=\"axes\">");
    svg.push_str(&format!(
        "<line x1=\"{left:.2}\" y1=\"{origin_y:.2}\" x2=\"{right:.2}\" y2=\"{origin_y:.2}\" stroke=\"{color}\"/><line x1=\"{origin_x:.2}\" y1=\"{top:.2}\" x2=\"{origin_x:.2}\" y2=\"{bottom:.2}\" stroke=\"{color}\"/>",
        left = axes.left,
        right = axes.right,
        top = axes.top,
        bottom = axes.bottom,
        color = theme.axis_color,
    ));
    for value in ticks(axes.x_domain.0, axes.x_domain.1, tick_count) {
        if value == 0.0 {
            continue;
        }
        let x = axes.sx(value);
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\"/>",
            origin_y - 3.0,
            origin_y + 3.0,
            theme.axis_color
        ));
        svg.push_str(&text_svg(
            x as f32,
            (origin_y + 15.0) as f32,
            &format_number(value),
            "middle",
            label_size,
            &theme.muted_text_color,
            theme,
        ));
    }
    for value in ticks(axes.y_domain.0, axes.y_domain.1, tick_count) {
        if value == 0.0 {
            continue;
        }
        let y = axes.sy(value);
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"{}\"/>",
            origin_x - 3.0,
            origin_x + 3.0,
            theme.axis_color
        ));
        svg.push_str(&text_svg(
            (origin_x - 6.0) as f32,
            (y + 4.0) as f32,
            &format_number(value),
            "end",
            label_size,
            &theme.muted_text_color,
            theme,
        ));
    }
    svg.push_str("</g>");
    svg
}
