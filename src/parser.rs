use crate::ir::{Direction, Edge, Graph, Node, default_edge_id};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;

static DIRECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^direction\s+(?P<dir>\w+)$").unwrap());
static NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^node\s+(?P<id>[^\s\[\]]+)\s*(?:\[(?P<label>[^\]]*)\])?$").unwrap()
});
static EDGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<eid>[^\s:@]+)@\s*)?(?P<src>[^\s:@]+)\s*-->\s*(?P<dst>[^\s:]+)(?:\s*:\s*(?P<label>.*))?$",
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid graph document: {0}")]
    Document(String),
    #[error("unknown direction `{0}`")]
    InvalidDirection(String),
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),
    #[error("duplicate edge id `{0}`")]
    DuplicateEdge(String),
    #[error("line {line}: cannot parse `{content}`")]
    InvalidLine { line: usize, content: String },
}

#[derive(Debug, Deserialize)]
struct GraphDocument {
    direction: Option<String>,
    #[serde(default)]
    nodes: Vec<NodeDocument>,
    #[serde(default)]
    edges: Vec<EdgeDocument>,
}

#[derive(Debug, Deserialize)]
struct NodeDocument {
    id: String,
    label: Option<String>,
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EdgeDocument {
    id: Option<String>,
    source: String,
    target: String,
    label: Option<String>,
    data: Option<serde_json::Value>,
}

/// Parses a JSON graph document or the edge-list text format, whichever the
/// input looks like.
pub fn parse_graph(input: &str) -> Result<Graph, ParseError> {
    parse_graph_with_direction(input, Direction::Down)
}

/// Like [`parse_graph`], using `default_direction` when the input does not
/// declare one.
pub fn parse_graph_with_direction(
    input: &str,
    default_direction: Direction,
) -> Result<Graph, ParseError> {
    let trimmed = input.trim_start();
    let graph = if trimmed.starts_with('{') {
        parse_json_graph(trimmed, default_direction)?
    } else {
        parse_text_graph(input, default_direction)?
    };
    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        direction = ?graph.direction,
        "parsed graph"
    );
    Ok(graph)
}

pub fn parse_json_graph(input: &str, default_direction: Direction) -> Result<Graph, ParseError> {
    let document: GraphDocument = match serde_json::from_str(input) {
        Ok(document) => document,
        Err(strict_err) => json5::from_str(input).map_err(|relaxed_err| {
            ParseError::Document(format!("{strict_err}; as JSON5: {relaxed_err}"))
        })?,
    };

    let mut graph = Graph::new();
    graph.direction = match document.direction.as_deref() {
        Some(token) => parse_direction(token)?,
        None => default_direction,
    };

    for node in document.nodes {
        if graph.nodes.contains_key(&node.id) {
            return Err(ParseError::DuplicateNode(node.id));
        }
        let label = node
            .label
            .or_else(|| {
                node.data
                    .as_ref()
                    .and_then(|data| data.get("label"))
                    .and_then(|label| label.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| node.id.clone());
        graph.nodes.insert(
            node.id.clone(),
            Node {
                id: node.id,
                label,
                data: node.data,
            },
        );
    }

    let mut edge_ids = HashSet::new();
    for edge in document.edges {
        let id = edge
            .id
            .unwrap_or_else(|| default_edge_id(&edge.source, &edge.target));
        if !edge_ids.insert(id.clone()) {
            return Err(ParseError::DuplicateEdge(id));
        }
        graph.add_edge(Edge {
            id,
            source: edge.source,
            target: edge.target,
            label: edge.label,
            data: edge.data,
        });
    }

    Ok(graph)
}

/// Line-oriented format:
///
/// ```text
/// direction DOWN
/// node 1 [Node 1]
/// 1 --> 2a : Ja
/// %% comment
/// ```
///
/// Edges create missing nodes with their id as label. An edge may carry an
/// explicit id as `id@ a --> b`.
pub fn parse_text_graph(input: &str, default_direction: Direction) -> Result<Graph, ParseError> {
    let mut graph = Graph::new();
    graph.direction = default_direction;
    let mut declared: HashSet<String> = HashSet::new();
    let mut edge_ids: HashSet<String> = HashSet::new();

    for (idx, raw_line) in input.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = DIRECTION_RE.captures(line) {
            graph.direction = parse_direction(&caps["dir"])?;
            continue;
        }

        if let Some(caps) = NODE_RE.captures(line) {
            let id = caps["id"].to_string();
            if !declared.insert(id.clone()) {
                return Err(ParseError::DuplicateNode(id));
            }
            let label = caps
                .name("label")
                .map(|m| m.as_str().trim().to_string())
                .filter(|label| !label.is_empty());
            graph.ensure_node(&id, label);
            continue;
        }

        if let Some(caps) = EDGE_RE.captures(line) {
            let source = &caps["src"];
            let target = &caps["dst"];
            graph.ensure_node(source, None);
            graph.ensure_node(target, None);
            let mut edge = Edge::new(source, target);
            if let Some(eid) = caps.name("eid") {
                edge.id = eid.as_str().to_string();
            }
            edge.label = caps
                .name("label")
                .map(|m| m.as_str().trim().to_string())
                .filter(|label| !label.is_empty());
            if !edge_ids.insert(edge.id.clone()) {
                return Err(ParseError::DuplicateEdge(edge.id));
            }
            graph.add_edge(edge);
            continue;
        }

        return Err(ParseError::InvalidLine {
            line: idx + 1,
            content: line.to_string(),
        });
    }

    Ok(graph)
}

fn parse_direction(token: &str) -> Result<Direction, ParseError> {
    Direction::from_token(token).ok_or_else(|| ParseError::InvalidDirection(token.to_string()))
}

fn strip_comment(line: &str) -> &str {
    match line.find("%%") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_document_with_data_labels() {
        let input = r#"{
            "nodes": [
                { "id": "1", "data": { "label": "Node 1" } },
                { "id": "2a", "label": "Node 2A" }
            ],
            "edges": [
                { "source": "1", "target": "2a", "label": "Ja" },
                { "id": "custom", "source": "2a", "target": "1" }
            ]
        }"#;
        let graph = parse_graph(input).expect("parses");
        assert_eq!(graph.direction, Direction::Down);
        assert_eq!(graph.nodes["1"].label, "Node 1");
        assert_eq!(graph.nodes["2a"].label, "Node 2A");
        assert_eq!(graph.edges[0].id, "e1-2a");
        assert_eq!(graph.edges[0].label.as_deref(), Some("Ja"));
        assert_eq!(graph.edges[1].id, "custom");
        assert!(graph.nodes["1"].data.is_some());
    }

    #[test]
    fn relaxed_json5_is_accepted() {
        let input = "{ direction: 'RIGHT', nodes: [{ id: 'a' }, { id: 'b', },], edges: [{ source: 'a', target: 'b' }] }";
        let graph = parse_graph(input).expect("json5 parses");
        assert_eq!(graph.direction, Direction::Right);
        assert_eq!(graph.nodes["a"].label, "a");
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let nodes = r#"{ "nodes": [{ "id": "a" }, { "id": "a" }] }"#;
        assert_eq!(
            parse_graph(nodes).unwrap_err(),
            ParseError::DuplicateNode("a".to_string())
        );
        let text = "node a\nnode a [Again]";
        assert_eq!(
            parse_graph(text).unwrap_err(),
            ParseError::DuplicateNode("a".to_string())
        );
        let edges = "a --> b\na --> b";
        assert_eq!(
            parse_graph(edges).unwrap_err(),
            ParseError::DuplicateEdge("ea-b".to_string())
        );
    }

    #[test]
    fn text_format() {
        let input = "\
%% decision fragment
direction DOWN
node 1 [Node 1]
node 2b [Node 2B]
1 --> 2b : Nee
2b --> 3c : Geen idee %% trailing comment
alt@ 3c --> 4
";
        let graph = parse_graph(input).expect("parses");
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.nodes["1"].label, "Node 1");
        assert_eq!(graph.nodes["3c"].label, "3c");
        assert_eq!(graph.edges[1].label.as_deref(), Some("Geen idee"));
        assert_eq!(graph.edges[2].id, "alt");
        assert!(graph.edges[2].label.is_none());
    }

    #[test]
    fn node_declared_after_edge_keeps_label() {
        let graph = parse_graph("a --> b\nnode b [Bee]").expect("parses");
        assert_eq!(graph.nodes["b"].label, "Bee");
    }

    #[test]
    fn default_direction_applies_without_header() {
        let graph = parse_graph_with_direction("a --> b", Direction::Right).expect("parses");
        assert_eq!(graph.direction, Direction::Right);
        let graph = parse_graph_with_direction("direction TD\na --> b", Direction::Right)
            .expect("parses");
        assert_eq!(graph.direction, Direction::Down);
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse_graph("a --> b\nthis is not valid").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLine {
                line: 2,
                content: "this is not valid".to_string()
            }
        );
        assert_eq!(
            parse_graph("direction UP").unwrap_err(),
            ParseError::InvalidDirection("UP".to_string())
        );
        assert!(matches!(parse_graph("{ nodes: ["), Err(ParseError::Document(_))));
    }
}
