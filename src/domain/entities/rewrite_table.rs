//! Legacy path rewrite table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Immutable mapping from logical image paths to physical path fragments.
///
/// Keys are matched case-insensitively. When the source lists a key more
/// than once, the later entry wins.
#[derive(Debug, Clone)]
pub struct RewriteTable {
    entries: HashMap<String, String>,
    built_at: DateTime<Utc>,
}

impl RewriteTable {
    /// Builds a table from ordered key/value pairs.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_lowercase(), value.into()))
            .collect();
        Self {
            entries,
            built_at: Utc::now(),
        }
    }

    /// Returns the mapped value for `key`, ignoring case.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build timestamp.
    #[must_use]
    pub const fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = RewriteTable::new([("Scooter/250/Babetta", "scooter/250/LM0037")]);
        assert_eq!(table.lookup("scooter/250/babetta"), Some("scooter/250/LM0037"));
        assert_eq!(table.lookup("SCOOTER/250/BABETTA"), Some("scooter/250/LM0037"));
        assert_eq!(table.lookup("scooter/250"), None);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let table = RewriteTable::new([("a", "first"), ("A", "second")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("a"), Some("second"));
    }

    #[test]
    fn test_empty_table() {
        let table = RewriteTable::new(Vec::<(String, String)>::new());
        assert!(table.is_empty());
        assert!(table.built_at() <= Utc::now());
    }
}
