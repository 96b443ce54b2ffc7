mod error;
mod layered;
pub(crate) mod routing;
pub mod session;
mod text;
pub(crate) mod types;

pub use error::LayoutError;
pub use layered::LayeredEngine;
pub use session::{CommitOutcome, LayoutSession, LayoutTicket};
pub use types::*;

use crate::config::{LayoutConfig, Ranker};
use crate::geometry::{Point, Section};
use crate::ir::{Direction, Graph};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use text::measure_label;

/// What a layout engine is asked to place.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    pub direction: Direction,
    pub ranker: Ranker,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub margin: f32,
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl EdgeSpec {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Positions and routes returned by an engine. Node coordinates are the
/// top-left corner of the box.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineOutput {
    #[serde(default)]
    pub nodes: Vec<PlacedNode>,
    #[serde(default)]
    pub edges: Vec<RoutedEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedEdge {
    pub id: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A layered layout service. Called once per layout pass.
pub trait LayoutEngine {
    fn layout(&self, request: &LayoutRequest) -> Result<EngineOutput, LayoutError>;
}

impl<E: LayoutEngine + ?Sized> LayoutEngine for &E {
    fn layout(&self, request: &LayoutRequest) -> Result<EngineOutput, LayoutError> {
        (**self).layout(request)
    }
}

/// Engine that answers every request with the same pre-computed output.
#[derive(Debug, Clone, Default)]
pub struct StaticEngine {
    output: EngineOutput,
}

impl StaticEngine {
    pub fn new(output: EngineOutput) -> Self {
        Self { output }
    }

    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        serde_json::from_str(json)
            .map(Self::new)
            .map_err(|err| LayoutError::Engine(format!("invalid engine output: {err}")))
    }
}

impl LayoutEngine for StaticEngine {
    fn layout(&self, _request: &LayoutRequest) -> Result<EngineOutput, LayoutError> {
        Ok(self.output.clone())
    }
}

pub fn layout_request(graph: &Graph, config: &LayoutConfig) -> LayoutRequest {
    LayoutRequest {
        direction: graph.direction,
        ranker: config.ranker,
        node_spacing: config.node_spacing,
        rank_spacing: config.rank_spacing,
        margin: config.margin,
        nodes: graph
            .nodes
            .values()
            .map(|node| NodeSpec {
                id: node.id.clone(),
                width: config.node_width,
                height: config.node_height,
                label: node.label.clone(),
            })
            .collect(),
        edges: graph
            .edges
            .iter()
            .map(|edge| EdgeSpec {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
            })
            .collect(),
    }
}

/// Runs one layout pass through `engine` and maps the result back onto
/// `graph`.
///
/// Nodes the engine leaves out stay at the origin; edges it does not route
/// keep `routing: None` and are drawn by the fallback renderer.
pub fn compute_layout(
    graph: &Graph,
    engine: &dyn LayoutEngine,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    validate_endpoints(graph)?;

    let request = layout_request(graph, config);
    let output = engine.layout(&request)?;
    tracing::debug!(
        nodes = request.nodes.len(),
        edges = request.edges.len(),
        placed = output.nodes.len(),
        routed = output.edges.len(),
        "layout pass finished"
    );

    let mut nodes: BTreeMap<String, NodeLayout> = graph
        .nodes
        .values()
        .map(|node| {
            let layout = NodeLayout {
                id: node.id.clone(),
                x: 0.0,
                y: 0.0,
                width: config.node_width,
                height: config.node_height,
                label: measure_label(&node.label, theme, config),
                data: node.data.clone(),
            };
            (node.id.clone(), layout)
        })
        .collect();

    let mut placed = 0usize;
    for placed_node in &output.nodes {
        let node = nodes
            .get_mut(&placed_node.id)
            .ok_or_else(|| LayoutError::NodeNotFound(placed_node.id.clone()))?;
        node.x = placed_node.x;
        node.y = placed_node.y;
        placed += 1;
    }
    if placed < nodes.len() {
        let missing: Vec<&str> = nodes
            .keys()
            .filter(|id| !output.nodes.iter().any(|p| &p.id == *id))
            .map(String::as_str)
            .collect();
        tracing::warn!(?missing, "engine left nodes unplaced; keeping them at the origin");
    }

    let mut routes: HashMap<&str, &RoutedEdge> = HashMap::new();
    for routed in &output.edges {
        routes.entry(routed.id.as_str()).or_insert(routed);
    }

    let mut edges: Vec<EdgeLayout> = graph
        .edges
        .iter()
        .map(|edge| {
            let routing = routes
                .get(edge.id.as_str())
                .filter(|routed| !routed.sections.is_empty())
                .map(|routed| EdgeRouting::new(routed.sections.clone()));
            EdgeLayout {
                id: edge.id.clone(),
                from: edge.source.clone(),
                to: edge.target.clone(),
                label: edge
                    .label
                    .as_deref()
                    .filter(|label| !label.trim().is_empty())
                    .map(|label| measure_label(label, theme, config)),
                data: edge.data.clone(),
                routing,
            }
        })
        .collect();

    normalize_layout(&mut nodes, &mut edges, config.margin);
    let (width, height) = bounds_with_edges(&nodes, &edges);

    Ok(Layout {
        direction: graph.direction,
        nodes,
        edges,
        width: width + config.margin,
        height: height + config.margin,
        generation: 0,
    })
}

/// [`compute_layout`] with the built-in dagre-backed engine.
pub fn compute_layered_layout(
    graph: &Graph,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    compute_layout(graph, &LayeredEngine, theme, config)
}

fn validate_endpoints(graph: &Graph) -> Result<(), LayoutError> {
    for edge in &graph.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !graph.nodes.contains_key(endpoint) {
                return Err(LayoutError::UnknownEndpoint {
                    edge: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
    }
    Ok(())
}

fn route_points(edges: &[EdgeLayout]) -> impl Iterator<Item = Point> + '_ {
    edges
        .iter()
        .filter_map(EdgeLayout::section)
        .flat_map(Section::points)
}

fn bounds_with_edges(nodes: &BTreeMap<String, NodeLayout>, edges: &[EdgeLayout]) -> (f32, f32) {
    let mut max_x: f32 = 0.0;
    let mut max_y: f32 = 0.0;
    for node in nodes.values() {
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    for point in route_points(edges) {
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    (max_x, max_y)
}

// Shifts everything so nothing sits closer than `padding` to the top-left
// edge of the canvas.
fn normalize_layout(nodes: &mut BTreeMap<String, NodeLayout>, edges: &mut [EdgeLayout], padding: f32) {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    for node in nodes.values() {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
    }
    for point in route_points(edges) {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
    }
    if min_x == f32::MAX {
        return;
    }

    let shift_x = if min_x < padding { padding - min_x } else { 0.0 };
    let shift_y = if min_y < padding { padding - min_y } else { 0.0 };
    if shift_x == 0.0 && shift_y == 0.0 {
        return;
    }

    for node in nodes.values_mut() {
        node.x += shift_x;
        node.y += shift_y;
    }
    for edge in edges.iter_mut() {
        if let Some(routing) = edge.routing.as_mut() {
            for section in routing.sections.iter_mut() {
                section.translate(shift_x, shift_y);
            }
        }
    }
}
