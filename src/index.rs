use crate::error::{DbError, Result};
use crate::value::{Row, Value};
use std::collections::HashMap;
use tracing::debug;

/// In-memory hash index from primary-key value to row, per table.
///
/// The index is never persisted: it is invalid after process start until
/// rebuilt from storage with [IndexEngine::build], and it is discarded on
/// table drop. Entries hold owned row copies, so index state never aliases
/// rows read from storage.
#[derive(Debug, Default)]
pub struct IndexEngine {
    indexes: HashMap<String, HashMap<Value, Row>>,
}

impl IndexEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the index for `table` by scanning `rows`.
    ///
    /// # Errors
    /// [DbError::MissingKey] if a row lacks the key column,
    /// [DbError::DuplicateKey] if two rows share a key value. The previous
    /// index for the table is kept when the scan fails.
    pub fn build(&mut self, table: &str, rows: &[Row], primary_key: &str) -> Result<()> {
        let mut index = HashMap::with_capacity(rows.len());
        for row in rows {
            let Some(key) = row.get(primary_key) else {
                return Err(DbError::MissingKey {
                    table: table.to_string(),
                    column: primary_key.to_string(),
                });
            };
            if index.insert(key.clone(), row.clone()).is_some() {
                return Err(DbError::DuplicateKey {
                    table: table.to_string(),
                    key: key.clone(),
                });
            }
        }
        debug!(table, entries = index.len(), "index built");
        self.indexes.insert(table.to_string(), index);
        Ok(())
    }

    /// Looks up the row holding `key`. Returns `None` when the table has no
    /// index or the key is absent. O(1) average.
    pub fn lookup(&self, table: &str, key: &Value) -> Option<&Row> {
        self.indexes.get(table)?.get(key)
    }

    /// Adds one entry, creating an empty index for the table if none exists.
    ///
    /// # Errors
    /// [DbError::DuplicateKey] if the key is already indexed,
    /// [DbError::MissingKey] if the row lacks the key column.
    pub fn insert(&mut self, table: &str, row: &Row, primary_key: &str) -> Result<()> {
        let Some(key) = row.get(primary_key) else {
            return Err(DbError::MissingKey {
                table: table.to_string(),
                column: primary_key.to_string(),
            });
        };
        let index = self.indexes.entry(table.to_string()).or_default();
        if index.contains_key(key) {
            return Err(DbError::DuplicateKey {
                table: table.to_string(),
                key: key.clone(),
            });
        }
        index.insert(key.clone(), row.clone());
        Ok(())
    }

    /// Removes the entry for `key` if present; no-op otherwise.
    pub fn delete(&mut self, table: &str, key: &Value) {
        if let Some(index) = self.indexes.get_mut(table) {
            index.remove(key);
        }
    }

    /// Discards the index for `table` entirely.
    pub fn drop_index(&mut self, table: &str) {
        self.indexes.remove(table);
    }

    /// Whether an index exists for `table` (built or started by insert).
    pub fn has_index(&self, table: &str) -> bool {
        self.indexes.contains_key(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str) -> Row {
        Row::from([
            ("id".to_string(), Value::Int(id)),
            ("name".to_string(), Value::String(name.into())),
        ])
    }

    #[test]
    fn test_build_and_lookup() {
        let mut index = IndexEngine::new();
        index
            .build("users", &[row(1, "a"), row(2, "b")], "id")
            .unwrap();

        assert_eq!(index.lookup("users", &Value::Int(1)), Some(&row(1, "a")));
        assert_eq!(index.lookup("users", &Value::Int(2)), Some(&row(2, "b")));
        assert_eq!(index.lookup("users", &Value::Int(3)), None);
    }

    #[test]
    fn test_lookup_without_index() {
        let index = IndexEngine::new();
        assert_eq!(index.lookup("users", &Value::Int(1)), None);
    }

    #[test]
    fn test_build_duplicate_key() {
        let mut index = IndexEngine::new();
        let result = index.build("users", &[row(1, "a"), row(1, "b")], "id");
        assert!(matches!(
            result,
            Err(DbError::DuplicateKey { key: Value::Int(1), .. })
        ));
    }

    #[test]
    fn test_build_missing_key() {
        let mut index = IndexEngine::new();
        let keyless = Row::from([("name".to_string(), Value::String("a".into()))]);
        assert!(matches!(
            index.build("users", &[keyless], "id"),
            Err(DbError::MissingKey { column, .. }) if column == "id"
        ));
    }

    #[test]
    fn test_insert_creates_index_and_rejects_duplicates() {
        let mut index = IndexEngine::new();
        assert!(!index.has_index("users"));

        index.insert("users", &row(1, "a"), "id").unwrap();
        assert!(index.has_index("users"));
        assert!(matches!(
            index.insert("users", &row(1, "b"), "id"),
            Err(DbError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_delete_is_noop_when_absent() {
        let mut index = IndexEngine::new();
        index.delete("users", &Value::Int(1));

        index.build("users", &[row(1, "a")], "id").unwrap();
        index.delete("users", &Value::Int(99));
        assert_eq!(index.lookup("users", &Value::Int(1)), Some(&row(1, "a")));

        index.delete("users", &Value::Int(1));
        assert_eq!(index.lookup("users", &Value::Int(1)), None);
    }

    #[test]
    fn test_delete_then_insert_rekeys_entry() {
        let mut index = IndexEngine::new();
        index.build("users", &[row(1, "a")], "id").unwrap();

        index.delete("users", &Value::Int(1));
        index.insert("users", &row(5, "a"), "id").unwrap();
        assert_eq!(index.lookup("users", &Value::Int(1)), None);
        assert_eq!(index.lookup("users", &Value::Int(5)), Some(&row(5, "a")));
    }

    #[test]
    fn test_rebuild_replaces_index() {
        let mut index = IndexEngine::new();
        index.build("users", &[row(1, "a")], "id").unwrap();
        index.build("users", &[row(2, "b")], "id").unwrap();

        assert_eq!(index.lookup("users", &Value::Int(1)), None);
        assert_eq!(index.lookup("users", &Value::Int(2)), Some(&row(2, "b")));
    }

    #[test]
    fn test_drop_index() {
        let mut index = IndexEngine::new();
        index.build("users", &[row(1, "a")], "id").unwrap();

        index.drop_index("users");
        assert!(!index.has_index("users"));
        assert_eq!(index.lookup("users", &Value::Int(1)), None);
    }
}
