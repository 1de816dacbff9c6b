//! Graph wire types: nodes, labeled directed edges, expansion deltas.
//!
//! Edge ids are derived from (source, target, label), which makes edge
//! insertion idempotent while still allowing two differently-labeled edges
//! between the same pair of nodes.

pub mod rivalry;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::store::{Faction, MobileSuit, Pilot};

/// Entity kinds that can be looked up and expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Faction,
    Pilot,
    MobileSuit,
}

impl EntityKind {
    /// Parse the wire form used by the expand endpoint.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "faction" => Some(Self::Faction),
            "pilot" => Some(Self::Pilot),
            "mobile_suit" => Some(Self::MobileSuit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faction => "faction",
            Self::Pilot => "pilot",
            Self::MobileSuit => "mobile_suit",
        }
    }
}

/// Node type tag. `Era` only appears on synthetic era nodes; it is not a
/// requestable entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Faction,
    Pilot,
    MobileSuit,
    Era,
}

impl NodeKind {
    /// The entity kind to expand when this node is activated, if any.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        match self {
            Self::Faction => Some(EntityKind::Faction),
            Self::Pilot => Some(EntityKind::Pilot),
            Self::MobileSuit => Some(EntityKind::MobileSuit),
            Self::Era => None,
        }
    }
}

impl From<EntityKind> for NodeKind {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Faction => Self::Faction,
            EntityKind::Pilot => Self::Pilot,
            EntityKind::MobileSuit => Self::MobileSuit,
        }
    }
}

/// Screen position. Assigned once by the session at first insertion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rendered graph vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub position: Position,
}

impl GraphNode {
    pub fn from_faction(f: &Faction) -> Self {
        Self {
            id: f.faction_id.clone(),
            kind: NodeKind::Faction,
            label: f.name.clone(),
            image: f.image_url.clone(),
            description: f.description.clone(),
            position: Position::default(),
        }
    }

    pub fn from_pilot(p: &Pilot) -> Self {
        Self {
            id: p.pilot_id.clone(),
            kind: NodeKind::Pilot,
            label: p.name.clone(),
            image: p.image_url.clone(),
            description: p.description.clone(),
            position: Position::default(),
        }
    }

    pub fn from_suit(s: &MobileSuit) -> Self {
        Self {
            id: s.suit_id.clone(),
            kind: NodeKind::MobileSuit,
            label: s.name.clone(),
            image: s.image_url.clone(),
            description: s.description.clone(),
            position: Position::default(),
        }
    }

    /// Synthetic era node. The id is derived from the era string, so factions
    /// sharing an era converge on the same node.
    pub fn era(era: &str) -> Self {
        Self {
            id: era_node_id(era),
            kind: NodeKind::Era,
            label: era.to_string(),
            image: None,
            description: None,
            position: Position::default(),
        }
    }
}

/// Deterministic id for an era node: lowercase, alphanumerics kept,
/// everything else collapsed to single dashes.
pub fn era_node_id(era: &str) -> String {
    let mut slug = String::with_capacity(era.len());
    let mut dash_pending = false;
    for c in era.chars() {
        if c.is_alphanumeric() {
            if dash_pending && !slug.is_empty() {
                slug.push('-');
            }
            dash_pending = false;
            slug.extend(c.to_lowercase());
        } else {
            dash_pending = true;
        }
    }
    format!("era:{}", slug)
}

/// Edge labels used by the discovery rules.
pub mod labels {
    pub const ERA: &str = "Era";
    pub const ENEMY: &str = "Enemy";
    pub const KEY_FIGURE: &str = "Key Figure";
    pub const LEADER: &str = "Leader";
    pub const AFFILIATED: &str = "Affiliated";
    pub const DEVELOPED_USED: &str = "Developed/Used";
    pub const DEVELOPED: &str = "Developed";
    pub const PILOTED: &str = "Piloted";
}

/// Label stand-in when an edge has none, keeping derived ids well-formed.
const UNLABELED: &str = "rel";

/// Derived edge id: `source|target|label`.
pub fn edge_id(source: &str, target: &str, label: Option<&str>) -> String {
    format!("{}|{}|{}", source, target, label.unwrap_or(UNLABELED))
}

/// A rendered, labeled directed relation between two node ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl GraphEdge {
    pub fn new(source: &str, target: &str, label: &str) -> Self {
        Self {
            id: edge_id(source, target, Some(label)),
            source: source.to_string(),
            target: target.to_string(),
            label: Some(label.to_string()),
        }
    }
}

/// One expansion's result: the delta the caller merges into its session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDelta {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Accumulates a delta while deduplicating within the call: the same node id
/// or edge id is never emitted twice from one expansion.
#[derive(Default)]
pub struct DeltaBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    node_ids: HashSet<String>,
    edge_ids: HashSet<String>,
}

impl DeltaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node unless its id was already emitted. Returns true when added.
    pub fn push_node(&mut self, node: GraphNode) -> bool {
        if self.node_ids.contains(&node.id) {
            return false;
        }
        self.node_ids.insert(node.id.clone());
        self.nodes.push(node);
        true
    }

    /// Add an edge unless its derived id was already emitted.
    pub fn push_edge(&mut self, edge: GraphEdge) -> bool {
        if self.edge_ids.contains(&edge.id) {
            return false;
        }
        self.edge_ids.insert(edge.id.clone());
        self.edges.push(edge);
        true
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub fn finish(self) -> GraphDelta {
        GraphDelta {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}
