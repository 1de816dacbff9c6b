//! Pilot expansion: led/affiliated factions, hostiles via rivalries, units.

use super::{skip_on_error, text, Resolver};
use crate::graph::{labels, rivalry, DeltaBuilder, GraphEdge, GraphNode};
use crate::store::{Faction, Pilot};

/// Bound on candidate factions fetched per affiliation token. The confirm
/// pass discards most of them; this just protects the query.
const TOKEN_CANDIDATE_LIMIT: usize = 5;

impl Resolver {
    pub(crate) async fn expand_pilot(&self, pilot: &Pilot, delta: &mut DeltaBuilder) {
        delta.push_node(GraphNode::from_pilot(pilot));

        let led = skip_on_error(
            "led factions",
            self.store().factions_led_by(&pilot.name).await,
        );
        let related = self.related_factions(pilot, led).await;

        for (faction, is_led) in &related {
            delta.push_node(GraphNode::from_faction(faction));
            let label = if *is_led { labels::LEADER } else { labels::AFFILIATED };
            delta.push_edge(GraphEdge::new(&pilot.pilot_id, &faction.faction_id, label));
        }

        self.expand_pilot_hostiles(pilot, &related, delta).await;
        self.expand_pilot_units(pilot, delta).await;
    }

    /// Union of factions led (leader-list membership) and factions inferred
    /// from the free-text affiliation field, keyed by id; led wins the label.
    async fn related_factions(&self, pilot: &Pilot, led: Vec<Faction>) -> Vec<(Faction, bool)> {
        let mut related: Vec<(Faction, bool)> = led.into_iter().map(|f| (f, true)).collect();

        let Some(affiliation) = pilot.affiliation.as_deref().map(str::trim).filter(|a| !a.is_empty())
        else {
            return related;
        };

        for token in text::affiliation_tokens(affiliation) {
            let candidates = skip_on_error(
                "affiliation candidates",
                self.store()
                    .factions_by_name_contains(&token, TOKEN_CANDIDATE_LIMIT)
                    .await,
            );
            for candidate in candidates {
                if related.iter().any(|(f, _)| f.faction_id == candidate.faction_id) {
                    continue;
                }
                // Second pass: a single generic token is not enough. The
                // candidate's full name must appear in the affiliation text,
                // or the whole affiliation inside the candidate's name.
                let name_in_affiliation = match text::ci_pattern(&candidate.name) {
                    Ok(re) => re.is_match(affiliation),
                    Err(e) => {
                        log::warn!("Skipping affiliation confirm for {:?}: {}", candidate.name, e);
                        continue;
                    }
                };
                let affiliation_in_name = candidate
                    .name
                    .to_lowercase()
                    .contains(&affiliation.to_lowercase());
                if name_in_affiliation || affiliation_in_name {
                    related.push((candidate, false));
                }
            }
        }

        related
    }

    /// Hostile individuals: for each related faction, consult the rivalry
    /// table and surface key figures of each rival, excluding the subject.
    async fn expand_pilot_hostiles(
        &self,
        pilot: &Pilot,
        related: &[(Faction, bool)],
        delta: &mut DeltaBuilder,
    ) {
        for (faction, _) in related {
            let Some(patterns) = rivalry::rivals_of(&faction.name) else {
                continue;
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
                let hostiles = skip_on_error(
                    "hostile individuals",
                    self.store()
                        .pilots_for_faction(&rival.name, &rival.leaders, self.hostile_limit())
                        .await,
                );
                for hostile in hostiles {
                    // The subject can appear among its own ally's rival's
                    // figures; never emit a self-loop for it.
                    if hostile.pilot_id == pilot.pilot_id {
                        continue;
                    }
                    delta.push_node(GraphNode::from_pilot(&hostile));
                    delta.push_edge(GraphEdge::new(
                        &pilot.pilot_id,
                        &hostile.pilot_id,
                        labels::ENEMY,
                    ));
                }
            }
        }
    }

    /// Units piloted, matched by exact name (raw and citation-stripped).
    /// Direction is pilot→unit, distinguishing "who pilots what" from the
    /// faction rule's "who fields what".
    async fn expand_pilot_units(&self, pilot: &Pilot, delta: &mut DeltaBuilder) {
        for unit_name in &pilot.mobile_suits {
            for variant in text::name_variants(unit_name) {
                match self.store().suit_by_name(&variant).await {
                    Ok(Some(unit)) => {
                        delta.push_node(GraphNode::from_suit(&unit));
                        delta.push_edge(GraphEdge::new(
                            &pilot.pilot_id,
                            &unit.suit_id,
                            labels::PILOTED,
                        ));
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!("Skipping unit lookup {:?}: {}", variant, e);
                    }
                }
            }
        }
    }
}
