use super::{escape_xml, placeholder_svg, svg_open, text_svg, text_width};
use crate::config::Config;
use crate::ir::{EdgeStyle, NodeLinkDiagram, NodeShape, Point};
use crate::layout::node_positions;
use std::collections::HashMap;

const LABEL_PADDING: f32 = 16.0;

#[derive(Debug, Clone, Copy)]
struct NodeBox {
    center: Point,
    half_width: f32,
    half_height: f32,
}

/// Draws nodes as labeled boxes joined by arrowed lines. Nodes without a
/// position are placed with the default layout.
pub fn render_node_link(diagram: &NodeLinkDiagram, config: &Config, id_prefix: &str) -> String {
    let theme = &config.theme;
    let style = &config.node_link;
    let width = config.canvas.width;
    let height = config.canvas.height;

    if diagram.nodes().is_empty() {
        return placeholder_svg(width, height, &style.placeholder_text, theme);
    }

    let fallback = node_positions(diagram.nodes().len(), diagram.direction, &config.canvas);
    let boxes: HashMap<&str, NodeBox> = diagram
        .nodes()
        .iter()
        .zip(fallback)
        .map(|(node, fallback)| {
            let node_width = style
                .node_width
                .max(text_width(&node.label, theme.font_size) + LABEL_PADDING);
            let node_box = NodeBox {
                center: node.position.unwrap_or(fallback),
                half_width: node_width / 2.0,
                half_height: style.node_height / 2.0,
            };
            (node.id.as_str(), node_box)
        })
        .collect();

    let marker_id = format!("{id_prefix}-arrow");
    let mut svg = svg_open(width, height, theme);
    svg.push_str(&format!(
        "<defs><marker id=\"{marker_id}\" viewBox=\"0 -5 10 10\" refX=\"10\" refY=\"0\" orient=\"auto\" markerWidth=\"6\" markerHeight=\"6\"><path d=\"M 0 -5 L 10 0 L 0 5\" fill=\"{}\"/></marker></defs>",
        theme.line_color
    ));

    svg.push_str("<g class=\"edges\">");
    for edge in diagram.edges() {
        let (Some(from), Some(to)) = (boxes.get(edge.from.as_str()), boxes.get(edge.to.as_str()))
        else {
            continue;
        };
        let stroke_width = match edge.style {
            EdgeStyle::Thick => style.thick_edge_stroke_width,
            _ => style.edge_stroke_width,
        };
        let dash = match edge.style {
            EdgeStyle::Dotted => format!(" stroke-dasharray=\"{}\"", style.dotted_dasharray),
            _ => String::new(),
        };

        let (d, mid) = if edge.from == edge.to {
            self_loop(from)
        } else {
            let (start, end) = clip_between(from, to);
            (
                format!("M {:.2} {:.2} L {:.2} {:.2}", start.x, start.y, end.x, end.y),
                Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0),
            )
        };
        svg.push_str(&format!(
            "<path class=\"edge\" d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{stroke_width}\"{dash} marker-end=\"url(#{marker_id})\"/>",
            theme.line_color
        ));

        if let Some(label) = edge.label.as_deref() {
            let label_width = text_width(label, theme.font_size) + 8.0;
            let label_height = theme.font_size + 6.0;
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{label_width:.2}\" height=\"{label_height:.2}\" rx=\"3\" fill=\"{}\"/>",
                mid.x - label_width / 2.0,
                mid.y - label_height / 2.0,
                theme.edge_label_background
            ));
            svg.push_str(&text_svg(
                mid.x,
                mid.y + theme.font_size / 3.0,
                label,
                "middle",
                theme.font_size,
                &theme.primary_text_color,
                theme,
            ));
        }
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for node in diagram.nodes() {
        let Some(node_box) = boxes.get(node.id.as_str()) else {
            continue;
        };
        let x = node_box.center.x - node_box.half_width;
        let y = node_box.center.y - node_box.half_height;
        let w = node_box.half_width * 2.0;
        let h = node_box.half_height * 2.0;
        let rx = match node.shape {
            NodeShape::Square => style.corner_radius,
            NodeShape::Rounded => h / 4.0,
            NodeShape::Circle => h / 2.0,
            NodeShape::Decision | NodeShape::Subroutine => 0.0,
        };
        svg.push_str(&format!(
            "<g class=\"node\" id=\"{}-node-{}\">",
            id_prefix,
            escape_xml(&node.id)
        ));
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" rx=\"{rx:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            theme.primary_color, theme.primary_border_color, style.node_stroke_width
        ));
        if node.shape == NodeShape::Subroutine {
            for inset in [6.0, w - 6.0] {
                svg.push_str(&format!(
                    "<line x1=\"{0:.2}\" y1=\"{y:.2}\" x2=\"{0:.2}\" y2=\"{1:.2}\" stroke=\"{2}\" stroke-width=\"1\"/>",
                    x + inset,
                    y + h,
                    theme.primary_border_color
                ));
            }
        }
        svg.push_str(&text_svg(
            node_box.center.x,
            node_box.center.y + 5.0,
            &node.label,
            "middle",
            theme.font_size,
            &theme.primary_text_color,
            theme,
        ));
        svg.push_str("</g>");
    }
    svg.push_str("</g></svg>");
    svg
}

/// Endpoints of the segment between two boxes, trimmed to their borders.
/// Overlapping boxes fall back to the centres.
fn clip_between(from: &NodeBox, to: &NodeBox) -> (Point, Point) {
    let dx = to.center.x - from.center.x;
    let dy = to.center.y - from.center.y;
    let exit = border_fraction(from, dx, dy);
    let entry = border_fraction(to, dx, dy);
    if exit + entry >= 1.0 {
        return (from.center, to.center);
    }
    (
        Point::new(from.center.x + dx * exit, from.center.y + dy * exit),
        Point::new(to.center.x - dx * entry, to.center.y - dy * entry),
    )
}

/// Fraction of the vector `(dx, dy)` that lies inside `node_box` when it
/// starts at the box centre.
fn border_fraction(node_box: &NodeBox, dx: f32, dy: f32) -> f32 {
    let fx = if dx.abs() > f32::EPSILON {
        node_box.half_width / dx.abs()
    } else {
        f32::INFINITY
    };
    let fy = if dy.abs() > f32::EPSILON {
        node_box.half_height / dy.abs()
    } else {
        f32::INFINITY
    };
    fx.min(fy)
}

fn self_loop(node_box: &NodeBox) -> (String, Point) {
    let top = node_box.center.y - node_box.half_height;
    let left = node_box.center.x - 12.0;
    let right = node_box.center.x + 12.0;
    let peak = top - 36.0;
    (
        format!("M {left:.2} {top:.2} C {left:.2} {peak:.2}, {right:.2} {peak:.2}, {right:.2} {top:.2}"),
        Point::new(node_box.center.x, peak),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Direction;
    use crate::layout::apply_layout;

    fn rendered(diagram: &mut NodeLinkDiagram) -> String {
        let config = Config::default();
        apply_layout(diagram, &config.canvas);
        render_node_link(diagram, &config, "s1-1")
    }

    #[test]
    fn two_boxes_and_one_arrow() {
        let mut diagram = NodeLinkDiagram::new(Direction::LeftRight);
        diagram.declare_node("A", "Start", NodeShape::Square);
        diagram.declare_node("B", "End", NodeShape::Square);
        diagram.add_edge("A", "B", EdgeStyle::Thin, None);
        let svg = rendered(&mut diagram);
        assert_eq!(svg.matches("<rect x=").count(), 2);
        assert_eq!(svg.matches("class=\"edge\"").count(), 1);
        assert!(svg.contains("marker-end=\"url(#s1-1-arrow)\""));
        assert!(svg.contains(">Start</text>"));
        assert!(svg.contains(">End</text>"));
    }

    #[test]
    fn lines_stop_at_box_borders() {
        let left = NodeBox {
            center: Point::new(100.0, 100.0),
            half_width: 40.0,
            half_height: 20.0,
        };
        let right = NodeBox {
            center: Point::new(300.0, 100.0),
            ..left
        };
        let (start, end) = clip_between(&left, &right);
        assert_eq!(start, Point::new(140.0, 100.0));
        assert_eq!(end, Point::new(260.0, 100.0));

        let overlapping = NodeBox {
            center: Point::new(120.0, 100.0),
            ..left
        };
        assert_eq!(clip_between(&left, &overlapping), (left.center, overlapping.center));
    }

    #[test]
    fn edge_styles_and_labels() {
        let mut diagram = NodeLinkDiagram::new(Direction::LeftRight);
        diagram.add_edge("A", "B", EdgeStyle::Dotted, Some("maybe".to_string()));
        diagram.add_edge("B", "C", EdgeStyle::Thick, None);
        let svg = rendered(&mut diagram);
        assert!(svg.contains("stroke-dasharray=\"5 4\""));
        assert!(svg.contains("stroke-width=\"3.5\""));
        assert!(svg.contains(">maybe</text>"));
    }

    #[test]
    fn empty_diagram_shows_placeholder() {
        let mut diagram = NodeLinkDiagram::new(Direction::LeftRight);
        let svg = rendered(&mut diagram);
        assert!(svg.contains("No nodes detected in diagram"));
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn labels_are_escaped_and_self_loops_drawn() {
        let mut diagram = NodeLinkDiagram::new(Direction::LeftRight);
        diagram.declare_node("A", "<b>&", NodeShape::Circle);
        diagram.add_edge("A", "A", EdgeStyle::Thin, None);
        let svg = rendered(&mut diagram);
        assert!(svg.contains("&lt;b&gt;&amp;"));
        assert!(svg.contains(" C "));
    }
}
