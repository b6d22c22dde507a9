//! Parser for the legacy rewrite configuration file.
//!
//! Each rule is `<key> <value>` split on the first whitespace run, the format
//! inherited from nginx `rewrite` maps. The legacy URL prefix is removed from
//! both sides and a trailing `;` is dropped from the value.

use tracing::warn;

/// Outcome of parsing a rewrite file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedRewrites {
    /// Rules in file order.
    pub entries: Vec<(String, String)>,
    /// Number of malformed lines that were skipped.
    pub skipped: usize,
}

/// Parses rewrite rules from `content`, stripping `legacy_prefix`.
#[must_use]
pub fn parse_rewrites(content: &str, legacy_prefix: &str) -> ParsedRewrites {
    let mut parsed = ParsedRewrites::default();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(char::is_whitespace) else {
            warn!(line = index + 1, content = %raw, "Malformed rewrite line");
            parsed.skipped += 1;
            continue;
        };

        let key = normalize(key, legacy_prefix);
        let mut value = normalize(value, legacy_prefix);
        if let Some(stripped) = value.strip_suffix(';') {
            value = stripped.trim_end().to_string();
        }

        if key.is_empty() || value.is_empty() {
            warn!(line = index + 1, content = %raw, "Rewrite line has an empty side");
            parsed.skipped += 1;
            continue;
        }

        parsed.entries.push((key, value));
    }

    parsed
}

fn normalize(part: &str, legacy_prefix: &str) -> String {
    let part = if legacy_prefix.is_empty() {
        part.to_string()
    } else {
        part.replace(legacy_prefix, "")
    };
    part.trim().trim_start_matches('/').to_string()
}
