//! Query text normalization for pattern grouping.
//!
//! Similar queries that differ only in literals collapse to one pattern so
//! the breakdown reports aggregate load per query shape instead of one
//! entry per parameter combination.

use lazy_static::lazy_static;

lazy_static! {
    static ref BIND_PLACEHOLDER: regex::Regex = regex::Regex::new(r"\$\d+").unwrap();
    static ref NUMERIC_LITERAL: regex::Regex = regex::Regex::new(r"\b\d+(?:\.\d+)?\b").unwrap();
    static ref STRING_LITERAL: regex::Regex = regex::Regex::new(r"'[^']*'").unwrap();
    static ref WHITESPACE_RUN: regex::Regex = regex::Regex::new(r"\s+").unwrap();
}

/// Maximum length of a normalized pattern key.
const MAX_PATTERN_LEN: usize = 100;

/// Strip literals from query text and collapse it to a grouping key.
///
/// Substitution order matters: bind placeholders first, then bare numeric
/// literals, then single-quoted strings, then whitespace collapse, trim,
/// and a 100-character cap.
pub fn normalize_query(query: &str) -> String {
    let text = BIND_PLACEHOLDER.replace_all(query, regex::NoExpand("$?"));
    let text = NUMERIC_LITERAL.replace_all(&text, "?");
    let text = STRING_LITERAL.replace_all(&text, "'?'");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().chars().take(MAX_PATTERN_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_placeholders_collapse() {
        assert_eq!(
            normalize_query("SELECT * FROM teams WHERE id = $1 AND season = $2"),
            "SELECT * FROM teams WHERE id = $? AND season = $?"
        );
    }

    #[test]
    fn numeric_and_string_literals_collapse() {
        assert_eq!(
            normalize_query("SELECT * FROM games WHERE week = 12 AND field = 'Diamond 3'"),
            "SELECT * FROM games WHERE week = ? AND field = '?'"
        );
    }

    #[test]
    fn whitespace_runs_collapse_and_trim() {
        assert_eq!(
            normalize_query("  SELECT *\n   FROM   rosters\t WHERE league_id = $3  "),
            "SELECT * FROM rosters WHERE league_id = $?"
        );
    }

    #[test]
    fn long_patterns_are_capped() {
        let query = format!("SELECT {} FROM somewhere", "col, ".repeat(50));
        assert_eq!(normalize_query(&query).chars().count(), 100);
    }

    #[test]
    fn identical_shapes_share_a_key() {
        let a = normalize_query("SELECT name FROM players WHERE id = 7");
        let b = normalize_query("SELECT name FROM players WHERE id = 90210");
        assert_eq!(a, b);
    }
}
