use crate::config::Config;
use crate::ir::{DiagramModel, NodeLinkDiagram};
use crate::layout::apply_layout;
use crate::parser::parse_diagram;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// JSON snapshot of a parsed and laid-out diagram.
#[derive(Debug, Serialize)]
pub struct ModelDump {
    pub notation: String,
    pub width: f32,
    pub height: f32,
    /// Placed nodes; empty for notations without a node-link model.
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub model: DiagramModel,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub shape: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub style: String,
    pub label: Option<String>,
    pub points: Vec<[f32; 2]>,
}

impl ModelDump {
    /// Snapshot of `model`. Node-link models are laid out first if any node
    /// is still unplaced.
    pub fn from_model(mut model: DiagramModel, config: &Config) -> Self {
        let (nodes, edges) = match model.as_node_link_mut() {
            Some(diagram) => {
                if diagram.nodes().iter().any(|node| node.position.is_none()) {
                    apply_layout(diagram, &config.canvas);
                }
                node_link_dump(diagram)
            }
            None => (Vec::new(), Vec::new()),
        };

        ModelDump {
            notation: model.tag().as_str().to_string(),
            width: config.canvas.width,
            height: config.canvas.height,
            nodes,
            edges,
            model,
        }
    }

    pub fn from_source(source: &str, config: &Config) -> Self {
        Self::from_model(parse_diagram(source), config)
    }
}

fn node_link_dump(diagram: &NodeLinkDiagram) -> (Vec<NodeDump>, Vec<EdgeDump>) {
    let centre = |id: &str| {
        diagram
            .node(id)
            .and_then(|node| node.position)
            .map(|point| [point.x, point.y])
    };

    let nodes = diagram
        .nodes()
        .iter()
        .map(|node| {
            let position = node.position.unwrap_or_default();
            NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                shape: format!("{:?}", node.shape),
                x: position.x,
                y: position.y,
            }
        })
        .collect();

    let edges = diagram
        .edges()
        .iter()
        .map(|edge| EdgeDump {
            from: edge.from.clone(),
            to: edge.to.clone(),
            style: format!("{:?}", edge.style),
            label: edge.label.clone(),
            points: [centre(&edge.from), centre(&edge.to)]
                .into_iter()
                .flatten()
                .collect(),
        })
        .collect();

    (nodes, edges)
}

pub fn write_model_dump(path: &Path, dump: &ModelDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}
