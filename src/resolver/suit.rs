//! Mobile-suit expansion: developing faction and known pilots.

use super::{text, Resolver};
use crate::graph::{labels, DeltaBuilder, GraphEdge, GraphNode};
use crate::store::MobileSuit;

impl Resolver {
    pub(crate) async fn expand_suit(&self, suit: &MobileSuit, delta: &mut DeltaBuilder) {
        delta.push_node(GraphNode::from_suit(suit));

        self.expand_suit_faction(suit, delta).await;
        self.expand_suit_pilots(suit, delta).await;
    }

    /// The faction field holds either a faction id or a free-form name;
    /// try the direct reference first, then fall back to a name lookup.
    async fn expand_suit_faction(&self, suit: &MobileSuit, delta: &mut DeltaBuilder) {
        let Some(reference) = suit.faction.as_deref().map(str::trim).filter(|f| !f.is_empty())
        else {
            return;
        };

        let by_id = match self.store().faction_by_id(reference).await {
            Ok(found) => found,
            Err(e) => {
                log::warn!("Skipping faction reference {:?}: {}", reference, e);
                return;
            }
        };
        let faction = match by_id {
            Some(f) => Some(f),
            None => match self.store().faction_by_name(reference).await {
                Ok(found) => found,
                Err(e) => {
                    log::warn!("Skipping faction name lookup {:?}: {}", reference, e);
                    return;
                }
            },
        };

        if let Some(faction) = faction {
            delta.push_node(GraphNode::from_faction(&faction));
            delta.push_edge(GraphEdge::new(
                &faction.faction_id,
                &suit.suit_id,
                labels::DEVELOPED,
            ));
        }
    }

    /// Known pilots by exact name (raw and citation-stripped variants).
    /// Direction is pilot→unit. Dangling names add nothing.
    async fn expand_suit_pilots(&self, suit: &MobileSuit, delta: &mut DeltaBuilder) {
        for pilot_name in &suit.pilots {
            for variant in text::name_variants(pilot_name) {
                match self.store().pilot_by_name(&variant).await {
                    Ok(Some(p)) => {
                        delta.push_node(GraphNode::from_pilot(&p));
                        delta.push_edge(GraphEdge::new(
                            &p.pilot_id,
                            &suit.suit_id,
                            labels::PILOTED,
                        ));
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!("Skipping pilot lookup {:?}: {}", variant, e);
                    }
                }
            }
        }
    }
}
