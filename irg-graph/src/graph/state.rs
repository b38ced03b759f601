//! In-memory graph state
//!
//! Nodes live in a `petgraph` undirected graph. Node indices are handed out
//! densely by the underlying storage and nodes are never removed, so the
//! index of a node is always the node count at the moment it was inserted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde_json::{Map, Value};

use crate::records::Record;

/// Attribute key holding the node kind
pub const NODE_TYPE_KEY: &str = "nodeType";

/// What a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    UserIdentity,
    Resource,
}

impl NodeKind {
    /// Value stored under `nodeType`
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::UserIdentity => "userIdentity",
            NodeKind::Resource => "resource",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Node weight
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub kind: NodeKind,

    /// Registry key (ARN, or principal id for identities without one)
    pub key: String,

    /// `nodeType` plus every field of the source mapping
    pub attributes: Map<String, Value>,
}

/// Edge weight
#[derive(Debug, Clone, Default)]
pub struct EdgeData {
    /// Records that connected or re-confirmed the pair, in arrival order
    pub events: Vec<Arc<Record>>,
}

/// Read-only view of a node
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub index: usize,
    data: &'a NodeData,
}

impl<'a> NodeView<'a> {
    pub fn key(&self) -> &'a str {
        &self.data.key
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind
    }

    pub fn attributes(&self) -> &'a Map<String, Value> {
        &self.data.attributes
    }

    pub fn data(&self) -> &'a NodeData {
        self.data
    }
}

/// Read-only view of an edge
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    /// Identity endpoint
    pub identity: usize,
    /// Resource endpoint
    pub resource: usize,
    data: &'a EdgeData,
}

impl<'a> EdgeView<'a> {
    pub fn events(&self) -> &'a [Arc<Record>] {
        &self.data.events
    }

    pub fn event_count(&self) -> usize {
        self.data.events.len()
    }
}

/// Counts describing a graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub identities: usize,
    pub resources: usize,
    /// Sum of edge event list lengths
    pub edge_events: usize,
}

/// Undirected identity/resource graph with a key registry.
///
/// Identities and resources share one key space, so an identity ARN that
/// later shows up as a resource resolves to the existing node.
#[derive(Debug, Default)]
pub struct IdentityGraph {
    graph: UnGraph<NodeData, EdgeData>,
    registry: HashMap<String, NodeIndex>,
}

impl IdentityGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Index of the node registered under `key`
    pub fn node_index(&self, key: &str) -> Option<usize> {
        self.registry.get(key).map(|index| index.index())
    }

    /// Node at `index`
    pub fn node(&self, index: usize) -> Option<NodeView<'_>> {
        self.graph
            .node_weight(NodeIndex::new(index))
            .map(|data| NodeView { index, data })
    }

    /// Node registered under `key`
    pub fn node_by_key(&self, key: &str) -> Option<NodeView<'_>> {
        self.node_index(key).and_then(|index| self.node(index))
    }

    /// All nodes in index order
    pub fn nodes(&self) -> impl Iterator<Item = NodeView<'_>> + '_ {
        self.graph.node_indices().map(move |index| NodeView {
            index: index.index(),
            data: &self.graph[index],
        })
    }

    /// All edges in creation order
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.graph.edge_references().map(|edge| EdgeView {
            identity: edge.source().index(),
            resource: edge.target().index(),
            data: edge.weight(),
        })
    }

    /// Edge between two nodes, in either direction
    pub fn edge_between(&self, a: usize, b: usize) -> Option<EdgeView<'_>> {
        let edge = self.find_edge(a, b)?;
        let (identity, resource) = self.graph.edge_endpoints(edge)?;
        Some(EdgeView {
            identity: identity.index(),
            resource: resource.index(),
            data: &self.graph[edge],
        })
    }

    /// Nodes adjacent to `index`, in ascending index order
    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        if index >= self.node_count() {
            return Vec::new();
        }
        let mut neighbors: Vec<usize> = self
            .graph
            .neighbors(NodeIndex::new(index))
            .map(|n| n.index())
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Number of nodes of a kind
    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.graph
            .raw_nodes()
            .iter()
            .filter(|node| node.weight.kind == kind)
            .count()
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            identities: self.count_kind(NodeKind::UserIdentity),
            resources: self.count_kind(NodeKind::Resource),
            edge_events: self
                .graph
                .raw_edges()
                .iter()
                .map(|edge| edge.weight.events.len())
                .sum(),
        }
    }

    /// Resolve `key` to its node, inserting a new node when unseen.
    ///
    /// `fields` is only invoked for new nodes; the `nodeType` attribute is
    /// added on top of the returned map. Returns the index and whether the
    /// node was created.
    pub(crate) fn resolve_or_insert<F>(&mut self, kind: NodeKind, key: &str, fields: F) -> (usize, bool)
    where
        F: FnOnce() -> Map<String, Value>,
    {
        if let Some(index) = self.registry.get(key) {
            return (index.index(), false);
        }

        let mut attributes = Map::new();
        attributes.insert(NODE_TYPE_KEY.to_string(), Value::String(kind.as_str().to_string()));
        attributes.extend(fields());

        let index = self.graph.add_node(NodeData {
            kind,
            key: key.to_string(),
            attributes,
        });
        debug_assert_eq!(index.index() + 1, self.graph.node_count());
        self.registry.insert(key.to_string(), index);
        (index.index(), true)
    }

    /// Connect two existing nodes or append to their edge's events.
    ///
    /// Returns `true` when a new edge was created.
    pub(crate) fn upsert_edge(&mut self, identity: usize, resource: usize, event: Arc<Record>) -> bool {
        match self.find_edge(identity, resource) {
            Some(edge) => {
                self.graph[edge].events.push(event);
                false
            }
            None => {
                self.graph.add_edge(
                    NodeIndex::new(identity),
                    NodeIndex::new(resource),
                    EdgeData {
                        events: vec![event],
                    },
                );
                true
            }
        }
    }

    fn find_edge(&self, a: usize, b: usize) -> Option<EdgeIndex> {
        let count = self.node_count();
        if a >= count || b >= count {
            return None;
        }
        self.graph.find_edge(NodeIndex::new(a), NodeIndex::new(b))
    }
}
