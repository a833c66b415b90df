pub mod sqlite;

use crate::app::Result;

pub use sqlite::SqliteStore;

/// Local key/value state that survives between runs.
pub trait Store {
    fn get_value(&self, key: &str) -> Result<Option<String>>;
    fn set_value(&self, key: &str, value: &str) -> Result<()>;
    /// Returns whether a value was removed.
    fn remove_value(&self, key: &str) -> Result<bool>;
    fn entries_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>>;
}
