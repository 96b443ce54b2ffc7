use crate::config::Config;
use crate::geometry::{Point, Section};
use crate::layout::Layout;
use crate::render::edge_geometry;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub direction: String,
    pub generation: u64,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label_lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    /// Sections exactly as the layout engine returned them.
    pub sections: Vec<Section>,
    /// Whether the edge fell back to the unsmoothed step polyline.
    pub fallback: bool,
    /// The SVG `d` attribute the renderer draws.
    pub path: Option<String>,
    pub label_anchor: Option<Point>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, config: &Config) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                label_lines: node.label.lines.clone(),
                data: node.data.clone(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| {
                let geometry = edge_geometry(layout, edge, config);
                EdgeDump {
                    id: edge.id.clone(),
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    label: edge.label.as_ref().map(|block| block.lines.join("\n")),
                    sections: edge
                        .routing
                        .as_ref()
                        .map(|routing| routing.sections.clone())
                        .unwrap_or_default(),
                    fallback: edge.routing.is_none(),
                    path: geometry.as_ref().map(|g| g.path.to_string()),
                    label_anchor: geometry.map(|g| g.label_anchor),
                }
            })
            .collect();

        LayoutDump {
            direction: format!("{:?}", layout.direction).to_uppercase(),
            generation: layout.generation,
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

pub fn layout_dump_json(layout: &Layout, config: &Config) -> anyhow::Result<String> {
    let dump = LayoutDump::from_layout(layout, config);
    Ok(serde_json::to_string_pretty(&dump)?)
}

pub fn write_layout_dump(path: &Path, layout: &Layout, config: &Config) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, config);
    serde_json::to_writer_pretty(&mut writer, &dump)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Edge, Graph};
    use crate::layout::{EngineOutput, PlacedNode, RoutedEdge, StaticEngine, compute_layout};

    #[test]
    fn dump_carries_sections_and_paths() {
        let mut graph = Graph::new();
        graph.ensure_node("a", None);
        graph.ensure_node("b", None);
        graph.add_edge(Edge::new("a", "b").with_label("Ja"));
        graph.add_edge(Edge::new("b", "a"));
        let output = EngineOutput {
            nodes: vec![
                PlacedNode {
                    id: "a".to_string(),
                    x: 8.0,
                    y: 8.0,
                },
                PlacedNode {
                    id: "b".to_string(),
                    x: 8.0,
                    y: 123.0,
                },
            ],
            edges: vec![RoutedEdge {
                id: "ea-b".to_string(),
                sections: vec![Section::straight(Point::new(83.0, 43.0), Point::new(83.0, 123.0))],
            }],
        };
        let config = Config::default();
        let layout = compute_layout(&graph, &StaticEngine::new(output), &config.theme, &config.layout)
            .expect("layout");
        let json = layout_dump_json(&layout, &config).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["direction"], "DOWN");
        let edges = value["edges"].as_array().expect("edges");
        assert_eq!(edges[0]["path"], "M83,43 L83,123");
        assert_eq!(edges[0]["labelAnchor"]["y"], 83.0);
        assert_eq!(edges[0]["sections"][0]["startPoint"]["x"], 83.0);
        assert_eq!(edges[0]["fallback"], false);
        assert_eq!(edges[1]["fallback"], true);
        assert!(edges[1]["sections"].as_array().expect("array").is_empty());
    }
}
