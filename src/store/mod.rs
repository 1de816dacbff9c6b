//! Entity store: typed queries over the three entity tables.
//!
//! This is the resolver's only data source. Lookups come in four shapes:
//! exact-id, exact name (case-insensitive), case-insensitive substring, and
//! set membership, plus bounded `LIMIT` variants for list traversals.

mod entities;

pub use entities::{Faction, MobileSuit, Pilot};

use rusqlite::params;
use crate::db::Db;
use crate::error::{LoregraphError, Result};

const FACTION_COLS: &str = "faction_id, name, era, description, image_url, leaders";
const PILOT_COLS: &str = "pilot_id, name, affiliation, description, image_url, mobile_suits";
const SUIT_COLS: &str = "suit_id, name, faction, manufacturer, operator, description, image_url, pilots";

/// Typed query layer over [`Db`].
pub struct Store {
    db: Db,
}

impl Store {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    // --- by-id lookups ---

    pub async fn faction_by_id(&self, id: &str) -> Result<Option<Faction>> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!("SELECT {} FROM factions WHERE faction_id = ?1", FACTION_COLS);
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query_map(params![id], Faction::from_row)?;
                rows.next().transpose().map_err(LoregraphError::Database)
            })
            .await
    }

    pub async fn pilot_by_id(&self, id: &str) -> Result<Option<Pilot>> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!("SELECT {} FROM pilots WHERE pilot_id = ?1", PILOT_COLS);
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query_map(params![id], Pilot::from_row)?;
                rows.next().transpose().map_err(LoregraphError::Database)
            })
            .await
    }

    pub async fn suit_by_id(&self, id: &str) -> Result<Option<MobileSuit>> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!("SELECT {} FROM mobile_suits WHERE suit_id = ?1", SUIT_COLS);
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query_map(params![id], MobileSuit::from_row)?;
                rows.next().transpose().map_err(LoregraphError::Database)
            })
            .await
    }

    // --- name lookups ---

    /// Exact faction name match, case-insensitive.
    pub async fn faction_by_name(&self, name: &str) -> Result<Option<Faction>> {
        let name = name.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!(
                    "SELECT {} FROM factions WHERE name = ?1 COLLATE NOCASE",
                    FACTION_COLS
                );
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query_map(params![name], Faction::from_row)?;
                rows.next().transpose().map_err(LoregraphError::Database)
            })
            .await
    }

    /// First faction whose name contains `pattern`, case-insensitive.
    pub async fn faction_by_name_contains(&self, pattern: &str) -> Result<Option<Faction>> {
        let pattern = pattern.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!(
                    "SELECT {} FROM factions \
                     WHERE instr(LOWER(name), LOWER(?1)) > 0 \
                     ORDER BY name LIMIT 1",
                    FACTION_COLS
                );
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query_map(params![pattern], Faction::from_row)?;
                rows.next().transpose().map_err(LoregraphError::Database)
            })
            .await
    }

    /// All factions whose name contains `token`, case-insensitive, bounded.
    pub async fn factions_by_name_contains(
        &self,
        token: &str,
        limit: usize,
    ) -> Result<Vec<Faction>> {
        let token = token.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!(
                    "SELECT {} FROM factions \
                     WHERE instr(LOWER(name), LOWER(?1)) > 0 \
                     ORDER BY name LIMIT ?2",
                    FACTION_COLS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![token, limit as i64], Faction::from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(LoregraphError::Database)
            })
            .await
    }

    /// Factions selected by a name allow-list (bootstrap roots).
    /// Returned in allow-list order for deterministic seeding.
    pub async fn factions_by_names(&self, names: &[String]) -> Result<Vec<Faction>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let names = names.to_vec();
        self.db
            .with_connection(move |conn| {
                let placeholders = names.iter().map(|_| "?").collect::<Vec<_>>().join(",");
                let sql = format!(
                    "SELECT {} FROM factions WHERE name IN ({})",
                    FACTION_COLS, placeholders
                );
                let mut stmt = conn.prepare(&sql)?;
                let params: Vec<Box<dyn rusqlite::ToSql>> = names
                    .iter()
                    .map(|n| Box::new(n.clone()) as Box<dyn rusqlite::ToSql>)
                    .collect();
                let rows = stmt.query_map(rusqlite::params_from_iter(params), Faction::from_row)?;
                let mut found = rows
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(LoregraphError::Database)?;
                found.sort_by_key(|f| names.iter().position(|n| *n == f.name));
                Ok(found)
            })
            .await
    }

    /// Factions whose leader list contains `name`. SQL prefilters on the raw
    /// JSON text; membership is confirmed against the decoded list so a
    /// substring hit inside an unrelated value can't leak through.
    pub async fn factions_led_by(&self, name: &str) -> Result<Vec<Faction>> {
        let name = name.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!(
                    "SELECT {} FROM factions WHERE instr(LOWER(leaders), LOWER(?1)) > 0",
                    FACTION_COLS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![name], Faction::from_row)?;
                let candidates = rows
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(LoregraphError::Database)?;
                let needle = name.to_lowercase();
                // Leader entries may carry citation markers ("Char Aznable[2]"),
                // so containment counts as membership alongside exact equality.
                Ok(candidates
                    .into_iter()
                    .filter(|f| {
                        f.leaders.iter().any(|l| {
                            let l = l.to_lowercase();
                            l == needle || l.contains(&needle)
                        })
                    })
                    .collect())
            })
            .await
    }

    /// Exact pilot name match, case-insensitive.
    pub async fn pilot_by_name(&self, name: &str) -> Result<Option<Pilot>> {
        let name = name.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!(
                    "SELECT {} FROM pilots WHERE name = ?1 COLLATE NOCASE",
                    PILOT_COLS
                );
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query_map(params![name], Pilot::from_row)?;
                rows.next().transpose().map_err(LoregraphError::Database)
            })
            .await
    }

    /// Pilots connected to a faction: free-text affiliation contains the
    /// faction name (case-insensitive), or the pilot's name appears in the
    /// faction's leader list. Bounded by `limit`.
    pub async fn pilots_for_faction(
        &self,
        faction_name: &str,
        leaders: &[String],
        limit: usize,
    ) -> Result<Vec<Pilot>> {
        let faction_name = faction_name.to_string();
        let leaders = leaders.to_vec();
        self.db
            .with_connection(move |conn| {
                let placeholders = if leaders.is_empty() {
                    "''".to_string()
                } else {
                    leaders.iter().map(|_| "?").collect::<Vec<_>>().join(",")
                };
                let sql = format!(
                    "SELECT {} FROM pilots \
                     WHERE (affiliation IS NOT NULL AND instr(LOWER(affiliation), LOWER(?1)) > 0) \
                        OR name IN ({}) \
                     ORDER BY name LIMIT {}",
                    PILOT_COLS, placeholders, limit as i64
                );
                let mut stmt = conn.prepare(&sql)?;
                let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(faction_name)];
                for l in &leaders {
                    params.push(Box::new(l.clone()));
                }
                let rows = stmt.query_map(rusqlite::params_from_iter(params), Pilot::from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(LoregraphError::Database)
            })
            .await
    }

    /// Exact unit name match, case-insensitive.
    pub async fn suit_by_name(&self, name: &str) -> Result<Option<MobileSuit>> {
        let name = name.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!(
                    "SELECT {} FROM mobile_suits WHERE name = ?1 COLLATE NOCASE",
                    SUIT_COLS
                );
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query_map(params![name], MobileSuit::from_row)?;
                rows.next().transpose().map_err(LoregraphError::Database)
            })
            .await
    }

    /// Units fielded by a faction: direct reference to the faction id, or
    /// operator/manufacturer free text containing the faction name. Bounded.
    pub async fn suits_for_faction(
        &self,
        faction_id: &str,
        faction_name: &str,
        limit: usize,
    ) -> Result<Vec<MobileSuit>> {
        let faction_id = faction_id.to_string();
        let faction_name = faction_name.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!(
                    "SELECT {} FROM mobile_suits \
                     WHERE faction = ?1 \
                        OR (operator IS NOT NULL AND instr(LOWER(operator), LOWER(?2)) > 0) \
                        OR (manufacturer IS NOT NULL AND instr(LOWER(manufacturer), LOWER(?2)) > 0) \
                     ORDER BY name LIMIT ?3",
                    SUIT_COLS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(
                    params![faction_id, faction_name, limit as i64],
                    MobileSuit::from_row,
                )?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(LoregraphError::Database)
            })
            .await
    }

    // --- inserts (seed tool and tests) ---

    pub async fn insert_faction(&self, faction: Faction) -> Result<()> {
        self.db
            .with_connection(move |conn| {
                let leaders = serde_json::to_string(&faction.leaders)
                    .map_err(|e| LoregraphError::Parse(e.to_string()))?;
                conn.execute(
                    "INSERT OR REPLACE INTO factions \
                     (faction_id, name, era, description, image_url, leaders) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        faction.faction_id,
                        faction.name,
                        faction.era,
                        faction.description,
                        faction.image_url,
                        leaders
                    ],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn insert_pilot(&self, pilot: Pilot) -> Result<()> {
        self.db
            .with_connection(move |conn| {
                let suits = serde_json::to_string(&pilot.mobile_suits)
                    .map_err(|e| LoregraphError::Parse(e.to_string()))?;
                conn.execute(
                    "INSERT OR REPLACE INTO pilots \
                     (pilot_id, name, affiliation, description, image_url, mobile_suits) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        pilot.pilot_id,
                        pilot.name,
                        pilot.affiliation,
                        pilot.description,
                        pilot.image_url,
                        suits
                    ],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn insert_suit(&self, suit: MobileSuit) -> Result<()> {
        self.db
            .with_connection(move |conn| {
                let pilots = serde_json::to_string(&suit.pilots)
                    .map_err(|e| LoregraphError::Parse(e.to_string()))?;
                conn.execute(
                    "INSERT OR REPLACE INTO mobile_suits \
                     (suit_id, name, faction, manufacturer, operator, description, image_url, pilots) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        suit.suit_id,
                        suit.name,
                        suit.faction,
                        suit.manufacturer,
                        suit.operator,
                        suit.description,
                        suit.image_url,
                        pilots
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Row counts per entity table (schema verification / seed summary).
    pub async fn entity_counts(&self) -> Result<(i64, i64, i64)> {
        self.db
            .with_connection(|conn| {
                let factions: i64 =
                    conn.query_row("SELECT COUNT(*) FROM factions", [], |row| row.get(0))?;
                let pilots: i64 =
                    conn.query_row("SELECT COUNT(*) FROM pilots", [], |row| row.get(0))?;
                let suits: i64 =
                    conn.query_row("SELECT COUNT(*) FROM mobile_suits", [], |row| row.get(0))?;
                Ok((factions, pilots, suits))
            })
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::migrate;
    use std::path::Path;
    use tempfile::TempDir;

    /// Fresh migrated store backed by a temp database.
    pub async fn temp_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Db::new(&db_path);
        let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
        db.with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
            .await
            .unwrap();
        (Store::new(db), temp_dir)
    }

    pub fn faction(id: &str, name: &str, era: &str, leaders: &[&str]) -> Faction {
        Faction {
            faction_id: id.to_string(),
            name: name.to_string(),
            era: if era.is_empty() { None } else { Some(era.to_string()) },
            description: None,
            image_url: None,
            leaders: leaders.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn pilot(id: &str, name: &str, affiliation: &str, suits: &[&str]) -> Pilot {
        Pilot {
            pilot_id: id.to_string(),
            name: name.to_string(),
            affiliation: if affiliation.is_empty() {
                None
            } else {
                Some(affiliation.to_string())
            },
            description: None,
            image_url: None,
            mobile_suits: suits.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn suit(id: &str, name: &str, faction: &str, operator: &str, pilots: &[&str]) -> MobileSuit {
        MobileSuit {
            suit_id: id.to_string(),
            name: name.to_string(),
            faction: if faction.is_empty() { None } else { Some(faction.to_string()) },
            manufacturer: None,
            operator: if operator.is_empty() { None } else { Some(operator.to_string()) },
            description: None,
            image_url: None,
            pilots: pilots.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;

    #[tokio::test]
    async fn test_faction_roundtrip_by_id() {
        let (store, _tmp) = temp_store().await;
        store
            .insert_faction(faction("f1", "Principality of Zeon", "Universal Century", &["Degwin Zabi"]))
            .await
            .unwrap();

        let found = store.faction_by_id("f1").await.unwrap().unwrap();
        assert_eq!(found.name, "Principality of Zeon");
        assert_eq!(found.era.as_deref(), Some("Universal Century"));
        assert_eq!(found.leaders, vec!["Degwin Zabi"]);

        assert!(store.faction_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_faction_by_name_case_insensitive() {
        let (store, _tmp) = temp_store().await;
        store
            .insert_faction(faction("f1", "Earth Federation", "", &[]))
            .await
            .unwrap();

        let found = store.faction_by_name("earth federation").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().faction_id, "f1");
    }

    #[tokio::test]
    async fn test_faction_by_name_contains() {
        let (store, _tmp) = temp_store().await;
        store
            .insert_faction(faction("f1", "Earth Federation", "", &[]))
            .await
            .unwrap();

        let found = store.faction_by_name_contains("federation").await.unwrap();
        assert_eq!(found.unwrap().faction_id, "f1");
        assert!(store.faction_by_name_contains("zeon").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_factions_by_names_preserves_allow_list_order() {
        let (store, _tmp) = temp_store().await;
        store.insert_faction(faction("f1", "AEUG", "", &[])).await.unwrap();
        store.insert_faction(faction("f2", "Titans", "", &[])).await.unwrap();

        let names = vec!["Titans".to_string(), "AEUG".to_string(), "Ghost".to_string()];
        let found = store.factions_by_names(&names).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Titans");
        assert_eq!(found[1].name, "AEUG");
    }

    #[tokio::test]
    async fn test_factions_led_by_confirms_membership() {
        let (store, _tmp) = temp_store().await;
        store
            .insert_faction(faction("f1", "Zeon", "", &["Char Aznable[2]", "Gihren Zabi"]))
            .await
            .unwrap();
        // Prefilter hit that must be rejected: name only appears in faction name
        store
            .insert_faction(faction("f2", "Char Fan Club", "", &["Somebody Else"]))
            .await
            .unwrap();

        let led = store.factions_led_by("Char Aznable").await.unwrap();
        assert_eq!(led.len(), 1);
        assert_eq!(led[0].faction_id, "f1");

        assert!(store.factions_led_by("Amuro Ray").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pilots_for_faction_affiliation_and_leaders() {
        let (store, _tmp) = temp_store().await;
        store
            .insert_pilot(pilot("p1", "Dummy Soldier", "Loyal soldier of the Earth Federation Forces", &[]))
            .await
            .unwrap();
        store
            .insert_pilot(pilot("p2", "Bright Noa", "", &[]))
            .await
            .unwrap();
        store
            .insert_pilot(pilot("p3", "Unrelated Pilot", "Wanderer", &[]))
            .await
            .unwrap();

        let leaders = vec!["Bright Noa".to_string()];
        let found = store
            .pilots_for_faction("Earth Federation", &leaders, 5)
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|p| p.pilot_id.as_str()).collect();
        assert!(ids.contains(&"p1"));
        assert!(ids.contains(&"p2"));
        assert!(!ids.contains(&"p3"));
    }

    #[tokio::test]
    async fn test_pilots_for_faction_respects_limit() {
        let (store, _tmp) = temp_store().await;
        for i in 0..10 {
            store
                .insert_pilot(pilot(
                    &format!("p{}", i),
                    &format!("Pilot {}", i),
                    "Zeon remnant",
                    &[],
                ))
                .await
                .unwrap();
        }

        let found = store.pilots_for_faction("Zeon", &[], 5).await.unwrap();
        assert_eq!(found.len(), 5);
    }

    #[tokio::test]
    async fn test_suits_for_faction_direct_and_fuzzy() {
        let (store, _tmp) = temp_store().await;
        store
            .insert_suit(suit("s1", "MS-06 Zaku II", "f1", "", &[]))
            .await
            .unwrap();
        store
            .insert_suit(suit("s2", "MSM-07 Z'Gok", "", "Principality of Zeon", &[]))
            .await
            .unwrap();
        store
            .insert_suit(suit("s3", "RX-78-2 Gundam", "", "Earth Federation", &[]))
            .await
            .unwrap();

        let found = store
            .suits_for_faction("f1", "Principality of Zeon", 15)
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|s| s.suit_id.as_str()).collect();
        assert!(ids.contains(&"s1"));
        assert!(ids.contains(&"s2"));
        assert!(!ids.contains(&"s3"));
    }

    #[tokio::test]
    async fn test_suit_and_pilot_by_name() {
        let (store, _tmp) = temp_store().await;
        store
            .insert_suit(suit("s1", "RX-78-2 Gundam", "", "", &["Amuro Ray"]))
            .await
            .unwrap();
        store
            .insert_pilot(pilot("p1", "Amuro Ray", "Earth Federation", &["RX-78-2 Gundam"]))
            .await
            .unwrap();

        assert!(store.suit_by_name("rx-78-2 gundam").await.unwrap().is_some());
        assert!(store.pilot_by_name("AMURO RAY").await.unwrap().is_some());
        assert!(store.pilot_by_name("Nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entity_counts() {
        let (store, _tmp) = temp_store().await;
        store.insert_faction(faction("f1", "Zeon", "", &[])).await.unwrap();
        store.insert_pilot(pilot("p1", "Amuro Ray", "", &[])).await.unwrap();

        let (f, p, s) = store.entity_counts().await.unwrap();
        assert_eq!((f, p, s), (1, 1, 0));
    }
}
