#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The engine placed a node that is not part of the input graph.
    #[error("node {0} not found")]
    NodeNotFound(String),
    #[error("edge {edge} references unknown node {node}")]
    UnknownEndpoint { edge: String, node: String },
    #[error("layout engine failed: {0}")]
    Engine(String),
}
