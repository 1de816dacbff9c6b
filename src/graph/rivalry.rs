//! Static rivalry table: curated faction-name → rival-name-pattern mapping.
//!
//! Hand-maintained domain knowledge, not derived from the store. Rival entries
//! are matched against faction names by case-insensitive substring, so a
//! pattern like "Zeon" covers "Principality of Zeon" and "Neo Zeon" records.

use std::collections::HashMap;

use once_cell::sync::Lazy;

static RIVALRIES: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert("Earth Federation", vec!["Zeon", "Titans", "Neo Zeon"]);
    table.insert("Principality of Zeon", vec!["Earth Federation"]);
    table.insert("Zeon", vec!["Earth Federation"]);
    table.insert("Neo Zeon", vec!["Earth Federation", "AEUG"]);
    table.insert("Titans", vec!["AEUG", "Karaba"]);
    table.insert("AEUG", vec!["Titans", "Axis Zeon"]);
    table.insert("ZAFT", vec!["Earth Alliance", "OMNI Enforcer"]);
    table.insert("Earth Alliance", vec!["ZAFT"]);
    table.insert("OZ", vec!["White Fang", "Earth Sphere Alliance"]);
    table.insert("Celestial Being", vec!["A-Laws", "United Nations Forces"]);
    table.insert("A-Laws", vec!["Celestial Being", "Katharon"]);
    table
});

/// Rival-name patterns for a faction's canonical name, if it has an entry.
/// Lookup is case-insensitive; the table is built once and never mutated, so
/// concurrent resolver calls all observe the same data.
pub fn rivals_of(faction_name: &str) -> Option<&'static [&'static str]> {
    RIVALRIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(faction_name))
        .map(|(_, rivals)| rivals.as_slice())
}
