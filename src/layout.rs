//! Deterministic placement for node-link diagrams.
//!
//! Horizontal diagrams are a single row across the middle of the canvas.
//! Vertical diagrams use a row-major grid with `ceil(sqrt(n))` columns.
//! Positions are node centres and depend only on the node count, the
//! direction and the canvas size.

use crate::config::CanvasConfig;
use crate::ir::{Direction, NodeLinkDiagram, Point};

/// Centre positions for `count` nodes, in declaration order.
pub fn node_positions(count: usize, direction: Direction, canvas: &CanvasConfig) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let (cols, rows) = if direction.is_vertical() {
        let cols = (count as f64).sqrt().ceil() as usize;
        (cols, count.div_ceil(cols))
    } else {
        (count, 1)
    };

    let x_step = canvas.width / (cols as f32 + 1.0);
    let y_step = if rows > 1 {
        canvas.height / (rows as f32 + 1.0)
    } else {
        canvas.height / 2.0
    };

    (0..count)
        .map(|idx| {
            let (col, row) = if direction.is_vertical() {
                (idx % cols, idx / cols)
            } else {
                (idx, 0)
            };
            let x = (col as f32 + 1.0) * x_step;
            let y = if rows > 1 {
                (row as f32 + 1.0) * y_step
            } else {
                y_step
            };
            Point::new(x, y)
        })
        .collect()
}

/// Assigns a position to every node of `diagram`.
pub fn apply_layout(diagram: &mut NodeLinkDiagram, canvas: &CanvasConfig) {
    let positions = node_positions(diagram.nodes().len(), diagram.direction, canvas);
    for (node, position) in diagram.nodes_mut().iter_mut().zip(positions) {
        node.position = Some(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EdgeStyle, NodeShape};

    #[test]
    fn horizontal_row_is_evenly_spaced() {
        let canvas = CanvasConfig::default();
        let points = node_positions(3, Direction::LeftRight, &canvas);
        assert_eq!(
            points,
            vec![
                Point::new(200.0, 240.0),
                Point::new(400.0, 240.0),
                Point::new(600.0, 240.0),
            ]
        );
        assert_eq!(node_positions(3, Direction::RightLeft, &canvas), points);
    }

    #[test]
    fn vertical_grid() {
        let canvas = CanvasConfig::default();
        let points = node_positions(5, Direction::TopDown, &canvas);
        // 3 columns, 2 rows
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Point::new(200.0, 160.0));
        assert_eq!(points[2], Point::new(600.0, 160.0));
        assert_eq!(points[3], Point::new(200.0, 320.0));

        let single = node_positions(1, Direction::BottomUp, &canvas);
        assert_eq!(single, vec![Point::new(400.0, 240.0)]);
    }

    #[test]
    fn empty_diagram_is_total() {
        assert!(node_positions(0, Direction::TopDown, &CanvasConfig::default()).is_empty());
        let mut diagram = NodeLinkDiagram::new(Direction::TopDown);
        apply_layout(&mut diagram, &CanvasConfig::default());
        assert!(diagram.nodes().is_empty());
    }

    #[test]
    fn apply_layout_sets_every_position() {
        let mut diagram = NodeLinkDiagram::new(Direction::LeftRight);
        diagram.declare_node("A", "Start", NodeShape::Square);
        diagram.add_edge("A", "B", EdgeStyle::Thin, None);
        apply_layout(&mut diagram, &CanvasConfig::default());
        assert!(diagram.nodes().iter().all(|node| node.position.is_some()));
        let b = diagram.node("B").and_then(|n| n.position).unwrap();
        assert!((b.x - 1600.0 / 3.0).abs() < 1e-3);
        assert_eq!(b.y, 240.0);
    }
}
