use super::{preprocess_input, strip_quotes};
use crate::ir::{Direction, EdgeStyle, NodeLinkDiagram, NodeShape};
use once_cell::sync::Lazy;
use regex::Regex;

static PARTICIPANT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:participant|actor)\s+(?P<id>\w+)(?:\s+as\s+(?P<alias>.+))?$").unwrap()
});
static MESSAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<from>\w+)\s*(?P<arrow>--?>>|--?>|--?x|--?\))\s*[+-]?(?P<to>\w+)\s*:\s*(?P<text>.*)$",
    )
    .unwrap()
});

/// Parses a sequence diagram into the node-link model: participants become
/// nodes and messages become labeled edges, laid out left to right.
pub fn parse_sequence_diagram(input: &str) -> NodeLinkDiagram {
    let mut graph = NodeLinkDiagram::new(Direction::LeftRight);

    for line in preprocess_input(input) {
        if line.to_ascii_lowercase().starts_with("sequence") {
            continue;
        }

        if let Some(caps) = PARTICIPANT_RE.captures(&line) {
            let id = &caps["id"];
            let label = caps
                .name("alias")
                .map(|m| strip_quotes(m.as_str()))
                .filter(|alias| !alias.is_empty())
                .unwrap_or_else(|| id.to_string());
            graph.declare_node(id, &label, NodeShape::Square);
            continue;
        }

        if let Some(caps) = MESSAGE_RE.captures(&line) {
            let style = if caps["arrow"].starts_with("--") {
                EdgeStyle::Dotted
            } else {
                EdgeStyle::Thin
            };
            let text = caps["text"].trim().to_string();
            graph.add_edge(&caps["from"], &caps["to"], style, Some(text));
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participants_and_messages() {
        let graph = parse_sequence_diagram(
            "sequenceDiagram\nparticipant Alice\nparticipant B as Bob\nAlice->>B: Hello\nB-->>Alice: Hi back",
        );
        assert_eq!(graph.direction, Direction::LeftRight);
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.node("B").map(|n| n.label.as_str()), Some("Bob"));
        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.edges()[0].from, "Alice");
        assert_eq!(graph.edges()[0].to, "B");
        assert_eq!(graph.edges()[0].label.as_deref(), Some("Hello"));
        assert_eq!(graph.edges()[1].style, EdgeStyle::Dotted);
    }

    #[test]
    fn messages_auto_declare_participants() {
        let graph = parse_sequence_diagram("sequenceDiagram\nA->B: ping\nB-xC: lost");
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn direction_is_forced_left_to_right() {
        let graph = parse_sequence_diagram("sequenceDiagram TB\nA->>B: x");
        assert_eq!(graph.direction, Direction::LeftRight);
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        let graph = parse_sequence_diagram("sequenceDiagram\nNote over A: thinking\nloop Every minute\nend");
        assert!(graph.nodes().is_empty());
        assert!(graph.edges().is_empty());
    }
}
