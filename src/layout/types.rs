use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Section};
use crate::ir::Direction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: TextBlock,
    pub data: Option<serde_json::Value>,
}

impl NodeLayout {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Route state the layout attaches to an edge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRouting {
    pub sections: Vec<Section>,
    /// Reserved for interactive re-routing; layout always resets it.
    pub is_dragged: bool,
}

impl EdgeRouting {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            is_dragged: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLayout {
    pub id: String,
    pub from: String,
    pub to: String,
    pub label: Option<TextBlock>,
    pub data: Option<serde_json::Value>,
    pub routing: Option<EdgeRouting>,
}

impl EdgeLayout {
    /// The route the renderer draws. Only the first section is used.
    pub fn section(&self) -> Option<&Section> {
        self.routing.as_ref().and_then(|r| r.sections.first())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub direction: Direction,
    pub nodes: BTreeMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
    /// Request generation this layout answers; `0` outside a session.
    pub generation: u64,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeLayout> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn routed_edges(&self) -> impl Iterator<Item = (&EdgeLayout, &Section)> {
        self.edges
            .iter()
            .filter_map(|edge| edge.section().map(|section| (edge, section)))
    }
}
