//! Graph session: the client-held accumulation of discovered nodes/edges.
//!
//! State grows monotonically for the lifetime of a view. Merge is idempotent
//! and commutative: nodes and edges are keyed by id, a rediscovered node never
//! moves, and a late-arriving expansion that only rediscovers contributes
//! nothing. Several activations may be in flight at once; each completion is
//! merged as a whole.

use std::collections::{HashMap, HashSet};

use crate::graph::{GraphDelta, GraphEdge, GraphNode, Position};
use crate::layout;
use crate::resolver::Resolver;

/// Accumulated graph state for one view.
#[derive(Default)]
pub struct GraphSession {
    nodes: Vec<GraphNode>,
    node_index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    edge_ids: HashSet<String>,
    selected_id: Option<String>,
}

impl GraphSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Seed an empty graph with the bootstrap roots, placed along a
    /// horizontal line. A resolver failure leaves the session empty; the
    /// caller renders that as still loading / failed.
    pub async fn initialize(&mut self, resolver: &Resolver) {
        match resolver.roots().await {
            Ok(delta) => {
                // Same already-present filter as merge; a repeated initialize
                // rediscovers the roots and contributes nothing.
                let new_roots: Vec<GraphNode> = delta
                    .nodes
                    .into_iter()
                    .filter(|n| !self.node_index.contains_key(&n.id))
                    .collect();
                let positions = layout::place_roots(new_roots.len());
                for (mut node, position) in new_roots.into_iter().zip(positions) {
                    node.position = position;
                    self.insert_node(node);
                }
            }
            Err(e) => {
                log::warn!("Failed to load graph roots: {}", e);
            }
        }
    }

    /// Select a node and expand it, merging whatever the resolver discovers.
    ///
    /// On resolver failure the state is left unchanged and no error flag is
    /// kept; re-activating the node is the retry path.
    pub async fn activate(&mut self, resolver: &Resolver, node_id: &str) {
        let Some(&index) = self.node_index.get(node_id) else {
            log::warn!("Activated unknown node {}", node_id);
            return;
        };
        self.selected_id = Some(node_id.to_string());

        let parent = self.nodes[index].position;
        // Synthetic nodes (eras) are selectable but not expandable
        let Some(kind) = self.nodes[index].kind.entity_kind() else {
            return;
        };

        match resolver.expand(kind, node_id).await {
            Ok(delta) => self.merge(parent, delta),
            Err(e) => {
                log::warn!("Expansion of {} {} failed: {}", kind.as_str(), node_id, e);
            }
        }
    }

    /// Deselect (triggered by interaction with empty canvas space).
    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    /// The currently selected node, if any.
    pub fn selected_node(&self) -> Option<&GraphNode> {
        self.selected_id
            .as_deref()
            .and_then(|id| self.node_index.get(id))
            .map(|&index| &self.nodes[index])
    }

    /// Merge a delta: filter to genuinely new nodes/edges, lay the new nodes
    /// out around the parent, append. Existing nodes keep their position.
    fn merge(&mut self, parent: Position, delta: GraphDelta) {
        let new_nodes: Vec<GraphNode> = delta
            .nodes
            .into_iter()
            .filter(|n| !self.node_index.contains_key(&n.id))
            .collect();

        let positions = layout::place_children(parent, new_nodes.len());
        for (mut node, position) in new_nodes.into_iter().zip(positions) {
            node.position = position;
            self.insert_node(node);
        }

        for edge in delta.edges {
            if !self.edge_ids.contains(&edge.id) {
                self.edge_ids.insert(edge.id.clone());
                self.edges.push(edge);
            }
        }
    }

    fn insert_node(&mut self, node: GraphNode) {
        debug_assert!(!self.node_index.contains_key(&node.id));
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }
}
