use serde::Serialize;
use std::collections::HashMap;

/// The notation a diagram source is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotationTag {
    NodeLink,
    Sequence,
    Class,
    Pie,
    Plot,
    VectorField,
    Chemistry,
    RawMarkup,
}

impl NotationTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NodeLink => "node-link",
            Self::Sequence => "sequence",
            Self::Class => "class",
            Self::Pie => "pie",
            Self::Plot => "plot",
            Self::VectorField => "vector-field",
            Self::Chemistry => "chemistry",
            Self::RawMarkup => "raw-markup",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    TopDown,
    BottomUp,
    #[default]
    LeftRight,
    RightLeft,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Some(Self::TopDown),
            "BT" => Some(Self::BottomUp),
            "LR" => Some(Self::LeftRight),
            "RL" => Some(Self::RightLeft),
            _ => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::TopDown | Self::BottomUp)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeShape {
    Square,
    Rounded,
    Circle,
    Decision,
    Subroutine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    /// Filled in by the layout synthesizer.
    pub position: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeStyle {
    Thin,
    Dotted,
    Thick,
    Open,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub style: EdgeStyle,
    pub label: Option<String>,
}

/// Shared model of flow, sequence and class notations.
///
/// Nodes keep declaration order; the index map is private so that every edge
/// endpoint is guaranteed to resolve to a node.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeLinkDiagram {
    pub direction: Direction,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    declared: Vec<bool>,
}

impl PartialEq for NodeLinkDiagram {
    fn eq(&self, other: &Self) -> bool {
        self.direction == other.direction && self.nodes == other.nodes && self.edges == other.edges
    }
}

impl NodeLinkDiagram {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Declares a node with an explicit label. The first explicit label wins;
    /// a node that was only auto-created from an edge takes this label.
    pub fn declare_node(&mut self, id: &str, label: &str, shape: NodeShape) {
        match self.index.get(id).copied() {
            Some(idx) if self.declared[idx] => {}
            Some(idx) => {
                self.nodes[idx].label = label.to_string();
                self.nodes[idx].shape = shape;
                self.declared[idx] = true;
            }
            None => {
                self.push_node(id, label, shape, true);
            }
        }
    }

    /// Makes sure `id` exists, creating it with its id as label.
    pub fn ensure_node(&mut self, id: &str) {
        if !self.index.contains_key(id) {
            self.push_node(id, id, NodeShape::Square, false);
        }
    }

    pub fn add_edge(&mut self, from: &str, to: &str, style: EdgeStyle, label: Option<String>) {
        self.ensure_node(from);
        self.ensure_node(to);
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            style,
            label: label.filter(|l| !l.is_empty()),
        });
    }

    fn push_node(&mut self, id: &str, label: &str, shape: NodeShape, declared: bool) {
        self.index.insert(id.to_string(), self.nodes.len());
        self.declared.push(declared);
        self.nodes.push(Node {
            id: id.to_string(),
            label: label.to_string(),
            shape,
            position: None,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Set when the source value was unreadable and `value` is a placeholder.
    pub estimated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PieChart {
    pub title: Option<String>,
    pub show_data: bool,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSpec {
    pub expressions: Vec<String>,
    pub domain: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vector {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorField {
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
    pub vectors: Vec<Vector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueryKind {
    Name,
    Formula,
    Smiles,
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChemistryQuery {
    pub query: String,
    pub kind: QueryKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Markup {
    pub markup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "notation", content = "model", rename_all = "kebab-case")]
pub enum DiagramModel {
    NodeLink(NodeLinkDiagram),
    Sequence(NodeLinkDiagram),
    Class(NodeLinkDiagram),
    Pie(PieChart),
    Plot(PlotSpec),
    VectorField(VectorField),
    Chemistry(ChemistryQuery),
    RawMarkup(Markup),
}

impl DiagramModel {
    pub fn tag(&self) -> NotationTag {
        match self {
            Self::NodeLink(_) => NotationTag::NodeLink,
            Self::Sequence(_) => NotationTag::Sequence,
            Self::Class(_) => NotationTag::Class,
            Self::Pie(_) => NotationTag::Pie,
            Self::Plot(_) => NotationTag::Plot,
            Self::VectorField(_) => NotationTag::VectorField,
            Self::Chemistry(_) => NotationTag::Chemistry,
            Self::RawMarkup(_) => NotationTag::RawMarkup,
        }
    }

    pub fn as_node_link(&self) -> Option<&NodeLinkDiagram> {
        match self {
            Self::NodeLink(graph) | Self::Sequence(graph) | Self::Class(graph) => Some(graph),
            _ => None,
        }
    }

    pub fn as_node_link_mut(&mut self) -> Option<&mut NodeLinkDiagram> {
        match self {
            Self::NodeLink(graph) | Self::Sequence(graph) | Self::Class(graph) => Some(graph),
            _ => None,
        }
    }
}
