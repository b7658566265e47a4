use super::preprocess_input;
use crate::ir::{Direction, EdgeStyle, NodeLinkDiagram, NodeShape};
use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^class\s+(?P<name>\w+)(?:~[^~]*~)?\s*(?P<body>\{.*)?$").unwrap()
});
static INHERIT_LEFT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<left>\w+)\s*<\|--\s*(?P<right>\w+)").unwrap());
static INHERIT_RIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<left>\w+)\s*--\|>\s*(?P<right>\w+)").unwrap());

/// Parses a class diagram. Classes become nodes (members are dropped) and
/// inheritance lines become edges pointing at the triangle head.
pub fn parse_class_diagram(input: &str) -> NodeLinkDiagram {
    let mut graph = NodeLinkDiagram::new(Direction::LeftRight);
    let mut in_body = false;

    for line in preprocess_input(input) {
        if in_body {
            if line.ends_with('}') {
                in_body = false;
            }
            continue;
        }
        if line.to_ascii_lowercase().starts_with("classdiagram") {
            continue;
        }

        if let Some(caps) = CLASS_RE.captures(&line) {
            let name = &caps["name"];
            graph.declare_node(name, name, NodeShape::Square);
            if let Some(body) = caps.name("body") {
                in_body = !body.as_str().contains('}');
            }
            continue;
        }

        if let Some(caps) = INHERIT_LEFT_RE.captures(&line) {
            graph.add_edge(&caps["right"], &caps["left"], EdgeStyle::Thin, None);
            continue;
        }

        if let Some(caps) = INHERIT_RIGHT_RE.captures(&line) {
            graph.add_edge(&caps["left"], &caps["right"], EdgeStyle::Thin, None);
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_and_inheritance() {
        let graph = parse_class_diagram(
            "classDiagram\nclass Animal { +name: String }\nclass Duck\nAnimal <|-- Duck",
        );
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["Animal", "Duck"]);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].from, "Duck");
        assert_eq!(graph.edges()[0].to, "Animal");
    }

    #[test]
    fn multi_line_class_bodies_are_skipped() {
        let graph = parse_class_diagram(
            "classDiagram\nclass Shape {\n  +area() float\n  Circle <|-- Nope\n}\nclass Circle\nShape <|-- Circle",
        );
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].from, "Circle");
    }

    #[test]
    fn mirrored_inheritance_arrow() {
        let graph = parse_class_diagram("classDiagram\nCar --|> Vehicle");
        assert_eq!(graph.edges()[0].from, "Car");
        assert_eq!(graph.edges()[0].to, "Vehicle");
        assert_eq!(graph.nodes().len(), 2);
    }

    #[test]
    fn generic_class_names() {
        let graph = parse_class_diagram("classDiagram\nclass List~T~ {\n}\n");
        assert_eq!(graph.node("List").map(|n| n.label.as_str()), Some("List"));
    }
}
