//! Faction expansion: era, rivals (+ their key figures), leadership, units.

use super::{skip_on_error, text, Resolver};
use crate::graph::{labels, rivalry, DeltaBuilder, GraphEdge, GraphNode};
use crate::store::Faction;

impl Resolver {
    pub(crate) async fn expand_faction(&self, faction: &Faction, delta: &mut DeltaBuilder) {
        delta.push_node(GraphNode::from_faction(faction));

        // Synthetic era node; factions sharing an era converge on the same id.
        if let Some(era) = faction.era.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            let era_node = GraphNode::era(era);
            let edge = GraphEdge::new(&faction.faction_id, &era_node.id, labels::ERA);
            delta.push_node(era_node);
            delta.push_edge(edge);
        }

        self.expand_faction_rivals(faction, delta).await;
        self.expand_faction_leaders(faction, delta).await;
        self.expand_faction_units(faction, delta).await;
    }

    /// Rivals from the static table, plus each rival's key figures.
    async fn expand_faction_rivals(&self, faction: &Faction, delta: &mut DeltaBuilder) {
        let Some(patterns) = rivalry::rivals_of(&faction.name) else {
            return;
        };

        for pattern in patterns {
            let rival = match self.store().faction_by_name_contains(pattern).await {
                Ok(Some(r)) => r,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Skipping rival lookup {:?}: {}", pattern, e);
                    continue;
                }
            };
            // Broad patterns can match the subject's own record
            if rival.faction_id == faction.faction_id {
                continue;
            }

            delta.push_node(GraphNode::from_faction(&rival));
            delta.push_edge(GraphEdge::new(
                &faction.faction_id,
                &rival.faction_id,
                labels::ENEMY,
            ));

            let figures = skip_on_error(
                "rival key figures",
                self.store()
                    .pilots_for_faction(&rival.name, &rival.leaders, self.hostile_limit())
                    .await,
            );
            for figure in figures {
                delta.push_node(GraphNode::from_pilot(&figure));
                delta.push_edge(GraphEdge::new(
                    &rival.faction_id,
                    &figure.pilot_id,
                    labels::KEY_FIGURE,
                ));
            }
        }
    }

    /// Leaders by exact name, tried raw and citation-stripped.
    async fn expand_faction_leaders(&self, faction: &Faction, delta: &mut DeltaBuilder) {
        for leader in &faction.leaders {
            for variant in text::name_variants(leader) {
                match self.store().pilot_by_name(&variant).await {
                    Ok(Some(p)) => {
                        delta.push_node(GraphNode::from_pilot(&p));
                        delta.push_edge(GraphEdge::new(
                            &faction.faction_id,
                            &p.pilot_id,
                            labels::LEADER,
                        ));
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!("Skipping leader lookup {:?}: {}", variant, e);
                    }
                }
            }
        }
    }

    /// Units fielded: direct faction reference or operator/manufacturer text.
    async fn expand_faction_units(&self, faction: &Faction, delta: &mut DeltaBuilder) {
        let units = skip_on_error(
            "faction units",
            self.store()
                .suits_for_faction(&faction.faction_id, &faction.name, self.unit_limit())
                .await,
        );
        for unit in units {
            delta.push_node(GraphNode::from_suit(&unit));
            delta.push_edge(GraphEdge::new(
                &faction.faction_id,
                &unit.suit_id,
                labels::DEVELOPED_USED,
            ));
        }
    }
}
