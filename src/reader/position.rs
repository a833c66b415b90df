use std::sync::Arc;

use crate::app::Result;
use crate::store::Store;

pub const KEY_PREFIX: &str = "caviar-reading-";

/// Last-read page per issue, stored as a decimal string under
/// `caviar-reading-{slug}`.
#[derive(Clone)]
pub struct ReadingPositions {
    store: Arc<dyn Store + Send + Sync>,
}

impl ReadingPositions {
    pub fn new(store: Arc<dyn Store + Send + Sync>) -> Self {
        Self { store }
    }

    pub fn key(issue_slug: &str) -> String {
        format!("{}{}", KEY_PREFIX, issue_slug)
    }

    /// Saved index for the issue, if it parses and falls inside `0..total_pages`.
    ///
    /// Anything else is ignored rather than clamped.
    pub fn load(&self, issue_slug: &str, total_pages: usize) -> Result<Option<usize>> {
        let raw = self.store.get_value(&Self::key(issue_slug))?;
        Ok(raw
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|index| *index < total_pages))
    }

    pub fn save(&self, issue_slug: &str, index: usize) -> Result<()> {
        self.store
            .set_value(&Self::key(issue_slug), &index.to_string())
    }

    pub fn clear(&self, issue_slug: &str) -> Result<bool> {
        self.store.remove_value(&Self::key(issue_slug))
    }

    /// All saved positions as `(slug, raw value)`.
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .store
            .entries_with_prefix(KEY_PREFIX)?
            .into_iter()
            .map(|(key, value)| (key[KEY_PREFIX.len()..].to_string(), value))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn positions() -> (Arc<SqliteStore>, ReadingPositions) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let positions = ReadingPositions::new(store.clone());
        (store, positions)
    }

    #[test]
    fn test_round_trip() {
        let (store, positions) = positions();
        positions.save("issue-3", 5).unwrap();
        assert_eq!(
            store.get_value("caviar-reading-issue-3").unwrap(),
            Some("5".to_string())
        );
        assert_eq!(positions.load("issue-3", 10).unwrap(), Some(5));
    }

    #[test]
    fn test_invalid_values_ignored() {
        let (store, positions) = positions();
        store.set_value("caviar-reading-bad", "abc").unwrap();
        store.set_value("caviar-reading-neg", "-1").unwrap();
        store.set_value("caviar-reading-far", "12").unwrap();

        assert_eq!(positions.load("bad", 10).unwrap(), None);
        assert_eq!(positions.load("neg", 10).unwrap(), None);
        assert_eq!(positions.load("far", 10).unwrap(), None);
        assert_eq!(positions.load("missing", 10).unwrap(), None);
    }

    #[test]
    fn test_list_and_clear() {
        let (_store, positions) = positions();
        positions.save("a", 1).unwrap();
        positions.save("b", 2).unwrap();

        assert_eq!(
            positions.list().unwrap(),
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
        assert!(positions.clear("a").unwrap());
        assert_eq!(positions.list().unwrap().len(), 1);
    }
}
