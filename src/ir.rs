use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Down,
    Right,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "DOWN" | "TD" | "TB" => Some(Self::Down),
            "RIGHT" | "LR" => Some(Self::Right),
            _ => None,
        }
    }

    /// Rank direction understood by dagre.
    pub fn rankdir(self) -> &'static str {
        match self {
            Direction::Down => "TB",
            Direction::Right => "LR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    /// Opaque caller payload, handed back untouched by events and dumps.
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub data: Option<serde_json::Value>,
}

impl Edge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: default_edge_id(source, target),
            source: source.to_string(),
            target: target.to_string(),
            label: None,
            data: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

pub fn default_edge_id(source: &str, target: &str) -> String {
    format!("e{source}-{target}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub direction: Direction,
    pub nodes: BTreeMap<String, Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            direction: Direction::Down,
            nodes: BTreeMap::new(),
            edges: Vec::new(),
        }
    }

    pub fn ensure_node(&mut self, id: &str, label: Option<String>) {
        let entry = self.nodes.entry(id.to_string()).or_insert(Node {
            id: id.to_string(),
            label: id.to_string(),
            data: None,
        });
        if let Some(label) = label {
            entry.label = label;
        }
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
