//! Relationship resolver: given one entity, discover its neighbors.
//!
//! Discovery mixes direct references, the static rivalry table, and fuzzy
//! text matching over free-text fields. False positives are accepted over
//! false negatives, and every list traversal is bounded. A single failing
//! lookup skips that one relation; the rest of the expansion proceeds.

mod faction;
mod pilot;
mod suit;
pub(crate) mod text;

use crate::config::GraphConfig;
use crate::error::{LoregraphError, Result};
use crate::graph::{DeltaBuilder, EntityKind, GraphDelta, GraphNode};
use crate::store::Store;

/// Stateless per-call resolver over the entity store.
pub struct Resolver {
    store: Store,
    graph: GraphConfig,
}

impl Resolver {
    pub fn new(store: Store, graph: GraphConfig) -> Self {
        Self { store, graph }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn unit_limit(&self) -> usize {
        self.graph.unit_limit
    }

    pub(crate) fn hostile_limit(&self) -> usize {
        self.graph.hostile_limit
    }

    /// Bootstrap set: the allow-listed notable factions, as nodes with no
    /// edges. Only used to seed an otherwise-empty graph.
    pub async fn roots(&self) -> Result<GraphDelta> {
        let factions = self.store.factions_by_names(&self.graph.root_factions).await?;
        let mut delta = DeltaBuilder::new();
        for f in &factions {
            delta.push_node(GraphNode::from_faction(f));
        }
        Ok(delta.finish())
    }

    /// Compute the delta of neighbors discoverable from one entity.
    ///
    /// The result is deduplicated within this call only; deduplication against
    /// what the caller already shows happens at merge time on the caller side.
    /// Fails only when `id` does not resolve to an entity of `kind`.
    pub async fn expand(&self, kind: EntityKind, id: &str) -> Result<GraphDelta> {
        let mut delta = DeltaBuilder::new();
        match kind {
            EntityKind::Faction => {
                let faction = self
                    .store
                    .faction_by_id(id)
                    .await?
                    .ok_or_else(|| LoregraphError::NotFound(format!("faction {}", id)))?;
                self.expand_faction(&faction, &mut delta).await;
            }
            EntityKind::Pilot => {
                let pilot = self
                    .store
                    .pilot_by_id(id)
                    .await?
                    .ok_or_else(|| LoregraphError::NotFound(format!("pilot {}", id)))?;
                self.expand_pilot(&pilot, &mut delta).await;
            }
            EntityKind::MobileSuit => {
                let suit = self
                    .store
                    .suit_by_id(id)
                    .await?
                    .ok_or_else(|| LoregraphError::NotFound(format!("mobile_suit {}", id)))?;
                self.expand_suit(&suit, &mut delta).await;
            }
        }
        let delta = delta.finish();
        log::debug!(
            "expand {} {}: {} nodes, {} edges",
            kind.as_str(),
            id,
            delta.nodes.len(),
            delta.edges.len()
        );
        Ok(delta)
    }
}

/// Partial-lookup failure policy: log and continue with nothing.
pub(crate) fn skip_on_error<T>(what: &str, res: Result<Vec<T>>) -> Vec<T> {
    match res {
        Ok(items) => items,
        Err(e) => {
            log::warn!("Skipping {}: {}", what, e);
            Vec::new()
        }
    }
}
