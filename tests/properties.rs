use diagram_renderer::config::CanvasConfig;
use diagram_renderer::ir::{Direction, NodeLinkDiagram, NodeShape};
use diagram_renderer::layout::{apply_layout, node_positions};
use diagram_renderer::sanitize::sanitize_svg;
use diagram_renderer::{
    NotationTag, RenderSurface, SurfaceContent, SurfaceId, classify, parse_diagram,
};
use proptest::prelude::*;
use regex::Regex;

const DIRECTIVE_WORDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequence",
    "class",
    "pie",
    "plot",
    "math",
    "chem",
    "smiles",
    "vector",
    "svg",
];

fn plain_header() -> impl Strategy<Value = String> {
    "[a-z]{1,12}".prop_filter("no directive keyword", |word| {
        !DIRECTIVE_WORDS.iter().any(|directive| word.contains(directive))
    })
}

fn node_id() -> impl Strategy<Value = String> {
    "[A-Z][a-z0-9]{0,4}"
}

fn arrow() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["-->", "---", "-.->", "==>"])
}

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(vec![
        Direction::TopDown,
        Direction::BottomUp,
        Direction::LeftRight,
        Direction::RightLeft,
    ])
}

fn mixed_case(word: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
        word.chars()
            .zip(upper)
            .map(|(ch, up)| if up { ch.to_ascii_uppercase() } else { ch })
            .collect()
    })
}

#[derive(Debug, Clone)]
enum SurfaceOp {
    Begin,
    Commit(usize),
}

fn surface_ops() -> impl Strategy<Value = Vec<SurfaceOp>> {
    prop::collection::vec(
        prop_oneof![Just(SurfaceOp::Begin), (0usize..8).prop_map(SurfaceOp::Commit)],
        1..40,
    )
}

proptest! {
    #[test]
    fn unrecognised_headers_fall_back_to_node_link(header in plain_header(), body in "[A-Z] --> [A-Z]") {
        let source = format!("{header}\n{body}");
        prop_assert_eq!(classify(&source), NotationTag::NodeLink);
    }

    #[test]
    fn parsing_is_idempotent(source in "[ -~\n]{0,200}") {
        prop_assert_eq!(parse_diagram(&source), parse_diagram(&source));
    }

    #[test]
    fn edge_endpoints_are_nodes(
        edges in prop::collection::vec((node_id(), arrow(), node_id()), 0..12),
        noise in "[ -~]{0,40}",
    ) {
        let mut source = String::from("graph TD\n");
        for (from, arrow, to) in &edges {
            source.push_str(&format!("{from} {arrow} {to}\n"));
        }
        source.push_str(&noise);

        let model = parse_diagram(&source);
        let diagram = model.as_node_link().expect("node-link model");
        for edge in diagram.edges() {
            prop_assert!(diagram.node(&edge.from).is_some(), "missing {}", edge.from);
            prop_assert!(diagram.node(&edge.to).is_some(), "missing {}", edge.to);
        }
    }

    #[test]
    fn layout_depends_only_on_count_and_direction(count in 0usize..60, direction in direction()) {
        let canvas = CanvasConfig::default();
        let positions = node_positions(count, direction, &canvas);
        prop_assert_eq!(&positions, &node_positions(count, direction, &canvas));
        prop_assert_eq!(positions.len(), count);
        for point in &positions {
            prop_assert!(point.x > 0.0 && point.x < canvas.width);
            prop_assert!(point.y > 0.0 && point.y < canvas.height);
        }

        let mut diagram = NodeLinkDiagram::new(direction);
        for idx in 0..count {
            diagram.declare_node(&format!("N{idx}"), "label", NodeShape::Square);
        }
        apply_layout(&mut diagram, &canvas);
        let placed: Vec<_> = diagram.nodes().iter().filter_map(|node| node.position).collect();
        prop_assert_eq!(placed, positions);
    }

    #[test]
    fn sanitizer_strips_scripts_and_handlers(
        script_tag in mixed_case("script"),
        handler in "[oO][nN][a-zA-Z]{1,8}",
        payload in "[a-z() ;]{0,12}",
        script_body in "[a-z();<> ]{0,20}",
    ) {
        let dirty = format!(
            "<svg {handler}=\"{payload}\"><g><{script_tag}>{script_body}</{script_tag}><rect {handler}='{payload}' width=\"3\"/></g></svg>"
        );
        let clean = sanitize_svg(&dirty).to_ascii_lowercase();
        let handler_attr = Regex::new(r"\son[a-z]+\s*=").unwrap();
        prop_assert!(!clean.contains("<script"));
        prop_assert!(!handler_attr.is_match(&clean), "{}", clean);
        prop_assert!(clean.contains("<rect width=\"3\"/>"));
    }

    #[test]
    fn only_the_latest_ticket_writes(ops in surface_ops()) {
        let surface = RenderSurface::new(SurfaceId::new(1));
        let mut tickets = Vec::new();
        let mut expected = SurfaceContent::Empty;

        for (step, op) in ops.into_iter().enumerate() {
            match op {
                SurfaceOp::Begin => {
                    tickets.push(surface.begin());
                    expected = SurfaceContent::Empty;
                }
                SurfaceOp::Commit(pick) if !tickets.is_empty() => {
                    let idx = pick % tickets.len();
                    let content = SurfaceContent::Svg(format!("<svg id=\"{step}\"/>"));
                    let written = surface.commit(&tickets[idx], content.clone());
                    prop_assert_eq!(written, idx == tickets.len() - 1);
                    if written {
                        expected = content;
                    }
                }
                SurfaceOp::Commit(_) => {}
            }
            prop_assert_eq!(surface.content(), expected.clone());
        }
    }
}
