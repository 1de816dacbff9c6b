//! Entity record types and row mapping.
//!
//! Relationship-bearing fields (`affiliation`, `operator`, `leaders`, ...) are
//! free text or JSON name lists in the store; they are matched best-effort at
//! query time rather than joined through foreign keys.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// An organization (e.g. "Principality of Zeon").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub faction_id: String,
    pub name: String,
    pub era: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Leader names; entries may carry citation markers like "Char Aznable[2]".
    #[serde(default)]
    pub leaders: Vec<String>,
}

/// An individual (e.g. "Amuro Ray").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pilot {
    pub pilot_id: String,
    pub name: String,
    /// Free-text allegiance, e.g. "Loyal soldier of the Earth Federation Forces".
    pub affiliation: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Names of units this individual piloted.
    #[serde(default)]
    pub mobile_suits: Vec<String>,
}

/// A unit (e.g. "RX-78-2 Gundam").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobileSuit {
    pub suit_id: String,
    pub name: String,
    /// Either a faction_id or a free-form faction name.
    pub faction: Option<String>,
    pub manufacturer: Option<String>,
    pub operator: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Names of known pilots.
    #[serde(default)]
    pub pilots: Vec<String>,
}

/// Decode a JSON name-list column. Malformed JSON degrades to an empty list
/// rather than failing the whole lookup.
fn decode_name_list(raw: &str, table: &str, id: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(names) => names,
        Err(e) => {
            log::warn!("Malformed name list in {} row {}: {}", table, id, e);
            Vec::new()
        }
    }
}

impl Faction {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let faction_id: String = row.get("faction_id")?;
        let leaders_raw: String = row.get("leaders")?;
        let leaders = decode_name_list(&leaders_raw, "factions", &faction_id);
        Ok(Self {
            faction_id,
            name: row.get("name")?,
            era: row.get("era")?,
            description: row.get("description")?,
            image_url: row.get("image_url")?,
            leaders,
        })
    }
}

impl Pilot {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let pilot_id: String = row.get("pilot_id")?;
        let suits_raw: String = row.get("mobile_suits")?;
        let mobile_suits = decode_name_list(&suits_raw, "pilots", &pilot_id);
        Ok(Self {
            pilot_id,
            name: row.get("name")?,
            affiliation: row.get("affiliation")?,
            description: row.get("description")?,
            image_url: row.get("image_url")?,
            mobile_suits,
        })
    }
}

impl MobileSuit {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let suit_id: String = row.get("suit_id")?;
        let pilots_raw: String = row.get("pilots")?;
        let pilots = decode_name_list(&pilots_raw, "mobile_suits", &suit_id);
        Ok(Self {
            suit_id,
            name: row.get("name")?,
            faction: row.get("faction")?,
            manufacturer: row.get("manufacturer")?,
            operator: row.get("operator")?,
            description: row.get("description")?,
            image_url: row.get("image_url")?,
            pilots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_name_list_valid() {
        let names = decode_name_list(r#"["Char Aznable","Gihren Zabi"]"#, "factions", "f1");
        assert_eq!(names, vec!["Char Aznable", "Gihren Zabi"]);
    }

    #[test]
    fn test_decode_name_list_malformed() {
        let names = decode_name_list("not json", "factions", "f1");
        assert!(names.is_empty());
    }

    #[test]
    fn test_decode_name_list_empty() {
        let names = decode_name_list("[]", "pilots", "p1");
        assert!(names.is_empty());
    }
}
