//! Free-text helpers for relationship inference.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{LoregraphError, Result};

/// Bracket-style citation markers copied in from wiki text, e.g. "Char Aznable[2]".
static CITATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("citation pattern"));

/// Tokens too generic to identify a faction on their own.
const STOP_WORDS: &[&str] = &["Forces", "Army", "Unit", "Group"];

/// Remove citation markers and trim.
pub fn strip_citations(name: &str) -> String {
    CITATION_RE.replace_all(name, "").trim().to_string()
}

/// A name as stored plus its citation-stripped form, deduplicated.
/// Lookups try both so records citing either form still resolve.
pub fn name_variants(name: &str) -> Vec<String> {
    let raw = name.trim().to_string();
    let stripped = strip_citations(name);
    if stripped.is_empty() || stripped == raw {
        vec![raw]
    } else {
        vec![raw, stripped]
    }
}

/// Split a free-text affiliation field into candidate faction-name tokens.
/// Splits on whitespace/commas/semicolons and drops stop-words and short
/// tokens; what survives is only a first pass — each candidate faction found
/// from a token must be confirmed against the full affiliation string.
pub fn affiliation_tokens(affiliation: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for raw in affiliation.split(|c: char| c.is_whitespace() || c == ',' || c == ';') {
        let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if token.len() <= 3 {
            continue;
        }
        if STOP_WORDS.iter().any(|w| w.eq_ignore_ascii_case(token)) {
            continue;
        }
        if !tokens.iter().any(|t: &String| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Case-insensitive matcher built from free text. The needle is escaped, but
/// the result is still fallible; callers treat a failure as one skipped
/// relation, not a failed expansion.
pub fn ci_pattern(needle: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){}", regex::escape(needle)))
        .map_err(|e| LoregraphError::Parse(format!("bad match pattern {:?}: {}", needle, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_citations() {
        assert_eq!(strip_citations("Char Aznable[2]"), "Char Aznable");
        assert_eq!(strip_citations("Gihren Zabi[note 1]"), "Gihren Zabi");
        assert_eq!(strip_citations("Amuro Ray"), "Amuro Ray");
    }

    #[test]
    fn test_name_variants() {
        assert_eq!(
            name_variants("Char Aznable[2]"),
            vec!["Char Aznable[2]", "Char Aznable"]
        );
        assert_eq!(name_variants("Amuro Ray"), vec!["Amuro Ray"]);
    }

    #[test]
    fn test_affiliation_tokens_drop_stop_words() {
        let tokens = affiliation_tokens("Loyal soldier of the Earth Federation Forces");
        assert_eq!(tokens, vec!["Loyal", "soldier", "Earth", "Federation"]);
    }

    #[test]
    fn test_affiliation_tokens_separators() {
        let tokens = affiliation_tokens("ZAFT; later Three Ships Alliance, briefly");
        assert!(tokens.contains(&"ZAFT".to_string()));
        assert!(tokens.contains(&"Three".to_string()));
        assert!(tokens.contains(&"Ships".to_string()));
        assert!(tokens.contains(&"Alliance".to_string()));
    }

    #[test]
    fn test_affiliation_tokens_short_dropped() {
        let tokens = affiliation_tokens("of the OZ ace");
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_ci_pattern_matches_case_insensitively() {
        let re = ci_pattern("Earth Federation").unwrap();
        assert!(re.is_match("loyal to the earth federation forces"));
        assert!(!re.is_match("Zeon loyalist"));
        // Metacharacters in free text are escaped, not interpreted
        let re = ci_pattern("Z'Gok (prototype)").unwrap();
        assert!(re.is_match("pilots a z'gok (PROTOTYPE) variant"));
    }
}
