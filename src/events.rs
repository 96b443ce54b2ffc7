//! Interaction events routed back to caller-owned payloads.
//!
//! A host (a UI shell, the WASM wrapper) reports raw interactions by element
//! id. [`EventAdapter`] resolves those ids in the current [`Layout`] and calls
//! the handler registered for that event with the caller's own `data`
//! payload. Routing state never leaks into handlers.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::layout::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeEvent {
    Click,
    DoubleClick,
    ContextMenu,
    MouseEnter,
    MouseMove,
    MouseLeave,
    DragStart,
    Drag,
    DragStop,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeEvent {
    Click,
    DoubleClick,
    ContextMenu,
    MouseEnter,
    MouseMove,
    MouseLeave,
    Delete,
    ReconnectStart,
    Reconnect,
    ReconnectEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Edge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Node => f.write_str("node"),
            ElementKind::Edge => f.write_str("edge"),
        }
    }
}

/// A raw interaction. Delete events may name several elements at once.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    Node { kind: NodeEvent, ids: Vec<String> },
    Edge { kind: EdgeEvent, ids: Vec<String> },
}

impl GraphEvent {
    pub fn node(kind: NodeEvent, id: impl Into<String>) -> Self {
        GraphEvent::Node {
            kind,
            ids: vec![id.into()],
        }
    }

    pub fn edge(kind: EdgeEvent, id: impl Into<String>) -> Self {
        GraphEvent::Edge {
            kind,
            ids: vec![id.into()],
        }
    }

    fn key(&self) -> EventKey {
        match self {
            GraphEvent::Node { kind, .. } => EventKey::Node(*kind),
            GraphEvent::Edge { kind, .. } => EventKey::Edge(*kind),
        }
    }
}

/// What a handler sees of an element: identity, label and caller payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementView<'a> {
    pub kind: ElementKind,
    pub id: &'a str,
    pub label: Option<&'a str>,
    pub data: Option<&'a serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("{kind} {id} not found in current layout")]
    UnknownElement { kind: ElementKind, id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EventKey {
    Node(NodeEvent),
    Edge(EdgeEvent),
}

type Handler = Box<dyn Fn(&[ElementView<'_>]) + Send + Sync>;

/// One handler slot per event kind.
#[derive(Default)]
pub struct EventAdapter {
    handlers: HashMap<EventKey, Handler>,
}

impl fmt::Debug for EventAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventAdapter")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for `kind`, replacing any earlier one.
    pub fn on_node<F>(&mut self, kind: NodeEvent, handler: F) -> &mut Self
    where
        F: Fn(&[ElementView<'_>]) + Send + Sync + 'static,
    {
        self.handlers.insert(EventKey::Node(kind), Box::new(handler));
        self
    }

    pub fn on_edge<F>(&mut self, kind: EdgeEvent, handler: F) -> &mut Self
    where
        F: Fn(&[ElementView<'_>]) + Send + Sync + 'static,
    {
        self.handlers.insert(EventKey::Edge(kind), Box::new(handler));
        self
    }

    pub fn has_handler(&self, event: &GraphEvent) -> bool {
        self.handlers.contains_key(&event.key())
    }

    /// Resolves the event's elements and runs its handler. Returns whether a
    /// handler was registered. Ids are resolved even without a handler so
    /// stale ids surface either way.
    pub fn dispatch(&self, layout: &Layout, event: &GraphEvent) -> Result<bool, EventError> {
        let views = resolve(layout, event)?;
        let Some(handler) = self.handlers.get(&event.key()) else {
            tracing::trace!(?event, "no handler registered");
            return Ok(false);
        };
        handler(&views);
        Ok(true)
    }
}

fn resolve<'a>(layout: &'a Layout, event: &GraphEvent) -> Result<Vec<ElementView<'a>>, EventError> {
    match event {
        GraphEvent::Node { ids, .. } => ids
            .iter()
            .map(|id| {
                let node = layout.node(id).ok_or_else(|| EventError::UnknownElement {
                    kind: ElementKind::Node,
                    id: id.clone(),
                })?;
                Ok(ElementView {
                    kind: ElementKind::Node,
                    id: node.id.as_str(),
                    label: node.label.lines.first().map(String::as_str),
                    data: node.data.as_ref(),
                })
            })
            .collect(),
        GraphEvent::Edge { ids, .. } => ids
            .iter()
            .map(|id| {
                let edge = layout.edge(id).ok_or_else(|| EventError::UnknownElement {
                    kind: ElementKind::Edge,
                    id: id.clone(),
                })?;
                Ok(ElementView {
                    kind: ElementKind::Edge,
                    id: edge.id.as_str(),
                    label: edge
                        .label
                        .as_ref()
                        .and_then(|block| block.lines.first())
                        .map(String::as_str),
                    data: edge.data.as_ref(),
                })
            })
            .collect(),
    }
}
