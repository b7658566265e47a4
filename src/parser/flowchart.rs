use super::{preprocess_input, split_statements, strip_quotes};
use crate::ir::{Direction, EdgeStyle, NodeLinkDiagram, NodeShape};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:flowchart|graph)\b\s*([a-z]{2})?\b").unwrap());
static DIRECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^direction\s+([a-z]{2})$").unwrap());
static ENDPOINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<id>\w+)\s*(?P<shape>\[\[[^\]]*\]\]|\(\([^)]*\)\)|\([^)]*\)|\{[^}]*\}|\[[^\]]*\])?(?::::[\w-]+)?",
    )
    .unwrap()
});
static TEXT_ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:--|==)\s*(?P<label>[^-=>|\s][^>|]*?)\s*(?P<arrow>-{2,}>|={2,}>|-{3,})")
        .unwrap()
});
static ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<arrow>-[-.]*>|=+>|-{2,})\s*(?:\|(?P<label>[^|]*)\|)?").unwrap()
});

const IGNORED_PREFIXES: [&str; 5] = ["classDef", "class ", "style ", "linkStyle", "click "];

struct Endpoint {
    id: String,
    shape: Option<(NodeShape, String)>,
}

struct Arrow {
    style: EdgeStyle,
    label: Option<String>,
}

/// Parses flow-graph notation.
///
/// Subgraph blocks are flattened: their members join the parent diagram and
/// the grouping itself is dropped.
pub fn parse_flowchart(input: &str) -> NodeLinkDiagram {
    let mut graph = NodeLinkDiagram::new(Direction::LeftRight);
    let mut subgraph_depth = 0usize;

    for raw_line in preprocess_input(input) {
        for line in split_statements(&raw_line) {
            if let Some(caps) = HEADER_RE.captures(&line) {
                if let Some(dir) = caps.get(1).and_then(|m| Direction::from_token(m.as_str())) {
                    graph.direction = dir;
                }
                continue;
            }

            if line == "end" {
                subgraph_depth = subgraph_depth.saturating_sub(1);
                continue;
            }

            if line.starts_with("subgraph") {
                subgraph_depth += 1;
                continue;
            }

            if let Some(caps) = DIRECTION_RE.captures(&line) {
                if subgraph_depth == 0 {
                    if let Some(dir) = Direction::from_token(&caps[1]) {
                        graph.direction = dir;
                    }
                }
                continue;
            }

            if IGNORED_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
                continue;
            }

            parse_statement(&line, &mut graph);
        }
    }

    graph
}

/// Parses `endpoint (arrow endpoint)*`, declaring shaped nodes and adding one
/// edge per hop. A bare identifier with no shape and no edge declares nothing.
fn parse_statement(line: &str, graph: &mut NodeLinkDiagram) {
    let Some((first, mut rest)) = parse_endpoint(line) else {
        return;
    };
    declare_endpoint(&first, graph);

    let mut current = first.id;
    while let Some((arrow, after_arrow)) = parse_arrow(rest) {
        let Some((next, after_node)) = parse_endpoint(after_arrow) else {
            break;
        };
        declare_endpoint(&next, graph);
        graph.add_edge(&current, &next.id, arrow.style, arrow.label);
        current = next.id;
        rest = after_node;
    }
}

fn declare_endpoint(endpoint: &Endpoint, graph: &mut NodeLinkDiagram) {
    if let Some((shape, label)) = &endpoint.shape {
        graph.declare_node(&endpoint.id, label, *shape);
    }
}

fn parse_endpoint(input: &str) -> Option<(Endpoint, &str)> {
    let caps = ENDPOINT_RE.captures(input)?;
    let whole = caps.get(0)?;
    let id = caps.name("id")?.as_str().to_string();
    let shape = caps.name("shape").map(|m| {
        let (shape, label) = parse_shape(m.as_str());
        let label = strip_quotes(label);
        let label = if label.is_empty() { id.clone() } else { label };
        (shape, label)
    });
    Some((Endpoint { id, shape }, &input[whole.end()..]))
}

fn parse_shape(token: &str) -> (NodeShape, &str) {
    let inner = |open: usize, close: usize| &token[open..token.len() - close];
    if token.starts_with("[[") {
        (NodeShape::Subroutine, inner(2, 2))
    } else if token.starts_with("((") {
        (NodeShape::Circle, inner(2, 2))
    } else if token.starts_with('(') {
        (NodeShape::Rounded, inner(1, 1))
    } else if token.starts_with('{') {
        (NodeShape::Decision, inner(1, 1))
    } else {
        (NodeShape::Square, inner(1, 1))
    }
}

fn parse_arrow(input: &str) -> Option<(Arrow, &str)> {
    if let Some(caps) = TEXT_ARROW_RE.captures(input) {
        let whole = caps.get(0)?;
        let arrow = Arrow {
            style: edge_style(caps.name("arrow")?.as_str()),
            label: caps.name("label").map(|m| strip_quotes(m.as_str())),
        };
        return Some((arrow, &input[whole.end()..]));
    }
    let caps = ARROW_RE.captures(input)?;
    let whole = caps.get(0)?;
    let arrow = Arrow {
        style: edge_style(caps.name("arrow")?.as_str()),
        label: caps.name("label").map(|m| strip_quotes(m.as_str())),
    };
    Some((arrow, &input[whole.end()..]))
}

fn edge_style(token: &str) -> EdgeStyle {
    if token.starts_with('=') {
        EdgeStyle::Thick
    } else if token.contains('.') {
        EdgeStyle::Dotted
    } else if token.ends_with('>') {
        EdgeStyle::Thin
    } else {
        EdgeStyle::Open
    }
}
