use std::collections::{HashMap, HashSet};

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use super::routing::{Bounds, step_section};
use super::{EngineOutput, LayoutEngine, LayoutError, LayoutRequest, PlacedNode, RoutedEdge};

/// Layered (Sugiyama) placement through `dagre_rust`, followed by orthogonal
/// step routing between the placed boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredEngine;

impl LayoutEngine for LayeredEngine {
    fn layout(&self, request: &LayoutRequest) -> Result<EngineOutput, LayoutError> {
        if request.nodes.is_empty() {
            return Ok(EngineOutput::default());
        }
        let nodes = place_nodes(request)?;
        let edges = route_edges(request, &nodes);
        Ok(EngineOutput { nodes, edges })
    }
}

fn place_nodes(request: &LayoutRequest) -> Result<Vec<PlacedNode>, LayoutError> {
    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some(request.direction.rankdir().to_string());
    graph_config.ranker = Some(request.ranker.as_str().to_string());
    graph_config.nodesep = Some(request.node_spacing);
    graph_config.ranksep = Some(request.rank_spacing);
    graph_config.marginx = Some(request.margin);
    graph_config.marginy = Some(request.margin);
    dagre_graph.set_graph(graph_config);

    for spec in &request.nodes {
        let mut node = DagreNode::default();
        node.width = spec.width;
        node.height = spec.height;
        dagre_graph.set_node(spec.id.clone(), Some(node));
    }

    // dagre is not a multigraph here: parallel edges collapse to one.
    let mut edge_set: HashSet<(&str, &str)> = HashSet::new();
    for edge in &request.edges {
        if edge.is_self_loop() {
            continue;
        }
        if !edge_set.insert((edge.source.as_str(), edge.target.as_str())) {
            continue;
        }
        let _ = dagre_graph.set_edge(&edge.source, &edge.target, Some(DagreEdge::default()), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut placed = Vec::with_capacity(request.nodes.len());
    for spec in &request.nodes {
        let Some(dagre_node) = dagre_graph.node(&spec.id) else {
            continue;
        };
        let x = dagre_node.x - spec.width / 2.0;
        let y = dagre_node.y - spec.height / 2.0;
        if !x.is_finite() || !y.is_finite() {
            return Err(LayoutError::Engine(format!(
                "dagre produced a non-finite position for node {}",
                spec.id
            )));
        }
        placed.push(PlacedNode {
            id: spec.id.clone(),
            x,
            y,
        });
    }
    Ok(placed)
}

fn route_edges(request: &LayoutRequest, placed: &[PlacedNode]) -> Vec<RoutedEdge> {
    let sizes: HashMap<&str, (f32, f32)> = request
        .nodes
        .iter()
        .map(|spec| (spec.id.as_str(), (spec.width, spec.height)))
        .collect();
    let bounds: HashMap<&str, Bounds> = placed
        .iter()
        .filter_map(|node| {
            let (width, height) = sizes.get(node.id.as_str()).copied()?;
            Some((
                node.id.as_str(),
                Bounds {
                    x: node.x,
                    y: node.y,
                    width,
                    height,
                },
            ))
        })
        .collect();

    let mut routed = Vec::with_capacity(request.edges.len());
    for edge in &request.edges {
        if edge.is_self_loop() {
            tracing::debug!(edge = %edge.id, "self-loop left unrouted");
            continue;
        }
        let (Some(from), Some(to)) = (
            bounds.get(edge.source.as_str()),
            bounds.get(edge.target.as_str()),
        ) else {
            continue;
        };
        match step_section(*from, *to, request.direction, request.rank_spacing) {
            Some(section) => routed.push(RoutedEdge {
                id: edge.id.clone(),
                sections: vec![section],
            }),
            None => tracing::debug!(edge = %edge.id, "edge runs against the flow; left unrouted"),
        }
    }
    routed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Ranker;
    use crate::ir::Direction;
    use crate::layout::{EdgeSpec, NodeSpec};

    const DECISION_TREE: [(&str, &str); 15] = [
        ("1", "2a"),
        ("1", "2b"),
        ("2a", "endA"),
        ("2a", "3a"),
        ("3a", "endA"),
        ("3a", "endB"),
        ("2b", "3a"),
        ("2b", "3b"),
        ("2b", "3c"),
        ("3b", "endB"),
        ("3b", "4"),
        ("3c", "endB"),
        ("3c", "4"),
        ("4", "endA"),
        ("4", "endB"),
    ];

    fn request(edges: &[(&str, &str)]) -> LayoutRequest {
        let mut ids: Vec<&str> = Vec::new();
        for (a, b) in edges {
            for id in [*a, *b] {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        LayoutRequest {
            direction: Direction::Down,
            ranker: Ranker::default(),
            node_spacing: 80.0,
            rank_spacing: 80.0,
            margin: 8.0,
            nodes: ids
                .iter()
                .map(|id| NodeSpec {
                    id: id.to_string(),
                    width: 150.0,
                    height: 35.0,
                    label: id.to_string(),
                })
                .collect(),
            edges: edges
                .iter()
                .map(|(a, b)| EdgeSpec {
                    id: format!("e{a}-{b}"),
                    source: a.to_string(),
                    target: b.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn chain_is_ranked_top_down() {
        let output = LayeredEngine
            .layout(&request(&[("a", "b"), ("b", "c")]))
            .expect("layout");
        let y = |id: &str| output.nodes.iter().find(|n| n.id == id).expect("placed").y;
        assert!(y("a") < y("b"));
        assert!(y("b") < y("c"));
        assert_eq!(output.edges.len(), 2);
    }

    #[test]
    fn routes_start_and_end_on_box_borders() {
        let output = LayeredEngine
            .layout(&request(&[("a", "b"), ("a", "c")]))
            .expect("layout");
        let node = |id: &str| output.nodes.iter().find(|n| n.id == id).expect("placed");
        for edge in &output.edges {
            let section = &edge.sections[0];
            let target = if edge.id == "ea-b" { node("b") } else { node("c") };
            assert_eq!(section.start_point.y, node("a").y + 35.0);
            assert_eq!(section.end_point.y, target.y);
            assert!(section.bend_points.is_empty() || section.bend_points.len() == 2);
        }
    }

    #[test]
    fn self_loops_are_not_routed() {
        let request = request(&[("a", "a"), ("a", "b")]);
        assert!(request.edges[0].is_self_loop());
        assert!(!request.edges[1].is_self_loop());
        let output = LayeredEngine.layout(&request).expect("layout");
        assert!(output.edges.iter().all(|edge| edge.id != "ea-a"));
    }

    #[test]
    fn decision_tree_routes_every_edge() {
        let request = request(&DECISION_TREE);
        assert_eq!(request.nodes.len(), 9);
        let output = LayeredEngine.layout(&request).expect("layout");
        assert_eq!(output.nodes.len(), 9);
        assert_eq!(output.edges.len(), 15);

        let y = |id: &str| output.nodes.iter().find(|n| n.id == id).expect("placed").y;
        for (source, target) in DECISION_TREE {
            assert!(y(source) < y(target), "{source} -> {target} should descend");
        }
        for edge in &output.edges {
            assert_eq!(edge.sections.len(), 1);
            let bends = edge.sections[0].bend_points.len();
            assert!(bends == 0 || bends == 2, "{} has {bends} bends", edge.id);
        }
    }

    #[test]
    fn tight_tree_and_longest_path_place_the_decision_tree() {
        for ranker in [Ranker::TightTree, Ranker::LongestPath] {
            let mut request = request(&DECISION_TREE);
            request.ranker = ranker;
            let output = LayeredEngine.layout(&request).expect("layout");
            assert_eq!(output.edges.len(), 15, "{ranker:?}");
        }
    }

    #[test]
    fn empty_request_is_empty_output() {
        let output = LayeredEngine.layout(&request(&[])).expect("layout");
        assert!(output.nodes.is_empty());
        assert!(output.edges.is_empty());
    }
}
