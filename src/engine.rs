use crate::condition::Condition;
use crate::error::{DbError, Result};
use crate::index::IndexEngine;
use crate::schema::{ColumnDef, SchemaManager, TableSchema};
use crate::storage::StorageEngine;
use crate::value::{Row, Value};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

/// The orchestrating execution layer and the only component callers invoke.
///
/// Owns the storage, schema and index engines outright; callers never reach
/// them directly, which is what keeps the schema/storage/index invariants in
/// one place. Every mutation takes `&mut self`, so a single engine instance
/// enforces a single-writer discipline per data directory.
pub struct ExecutionEngine {
    storage: StorageEngine,
    schema: SchemaManager,
    index: IndexEngine,
}

impl ExecutionEngine {
    /// Composes an engine from a storage backend and a schema store. The
    /// index always starts empty; call [ExecutionEngine::load_table_index]
    /// per table before trusting point lookups.
    pub fn new(storage: StorageEngine, schema: SchemaManager) -> Self {
        Self {
            storage,
            schema,
            index: IndexEngine::new(),
        }
    }

    /// Creates a table: schema first, then the storage artifact, then an
    /// empty index when a primary key is declared.
    ///
    /// If storage creation fails after the schema was persisted, the schema
    /// is dropped again (best effort) and the original error re-raised. A
    /// failed rollback surfaces as [DbError::RollbackFailed] instead of
    /// leaving the inconsistency silent.
    pub fn create_table(
        &mut self,
        table: &str,
        columns: Vec<ColumnDef>,
        primary_key: Option<String>,
    ) -> Result<()> {
        self.schema
            .create_table_schema(table, columns, primary_key.clone())?;

        let created = self.storage.create_table_file(table);
        if let Err(original) = created {
            warn!(table, error = %original, "storage creation failed, rolling back schema");
            if let Err(rollback) = self.schema.drop_table_schema(table) {
                return Err(DbError::RollbackFailed {
                    table: table.to_string(),
                    original: Box::new(original),
                    rollback: Box::new(rollback),
                });
            }
            return Err(original);
        }

        if let Some(pk) = &primary_key {
            self.index.build(table, &[], pk)?;
        }
        debug!(table, "table created");
        Ok(())
    }

    /// Validates and appends one row, enforcing primary-key uniqueness via
    /// the index rather than a scan.
    ///
    /// The index entry is added only after the durable write succeeds: a
    /// crash between write and index update self-heals on the next
    /// [ExecutionEngine::load_table_index], and a crash before the write has
    /// no index-side effect at all.
    pub fn insert_row(&mut self, table: &str, row: Row) -> Result<()> {
        let schema = self.schema.get_table_schema(table)?;
        schema.validate_row(&row)?;

        let mut rows = self.storage.read_table(table)?;

        if let Some(pk) = &schema.primary_key {
            // validate_row guarantees the key column is present
            if let Some(key) = row.get(pk) {
                if self.index.lookup(table, key).is_some() {
                    return Err(DbError::DuplicateKey {
                        table: table.to_string(),
                        key: key.clone(),
                    });
                }
            }
        }

        rows.push(row.clone());
        self.storage.write_table(table, &rows)?;

        if let Some(pk) = &schema.primary_key {
            self.index.insert(table, &row, pk)?;
        }
        Ok(())
    }

    /// Full scan: keeps rows matching `filter` (all rows when `None`) and
    /// projects each onto `projection` when given. A requested column absent
    /// from a row is silently omitted rather than failing.
    pub fn select_rows(
        &self,
        table: &str,
        filter: Option<&Condition>,
        projection: Option<&[String]>,
    ) -> Result<Vec<Row>> {
        let mut rows = self.storage.read_table(table)?;

        if let Some(cond) = filter {
            rows.retain(|row| cond.matches(row));
        }

        if let Some(columns) = projection {
            rows = rows
                .into_iter()
                .map(|mut row| {
                    let mut projected = Row::new();
                    for name in columns {
                        if let Some(value) = row.remove(name) {
                            projected.insert(name.clone(), value);
                        }
                    }
                    projected
                })
                .collect();
        }
        Ok(rows)
    }

    /// O(1) point lookup through the index. Returns `None` when the key is
    /// absent, or when the index was never built this process lifetime, even
    /// if matching data exists on disk.
    pub fn select_by_primary_key(&self, table: &str, key: &Value) -> Option<Row> {
        self.index.lookup(table, key).cloned()
    }

    /// Deletes every row matching `filter` and persists the survivors as the
    /// new table content. Returns the number of rows removed.
    pub fn delete_rows(&mut self, table: &str, filter: &Condition) -> Result<usize> {
        let rows = self.storage.read_table(table)?;
        let schema = self.schema.get_table_schema(table)?;

        let mut kept = Vec::with_capacity(rows.len());
        let mut deleted = 0usize;
        for row in rows {
            if filter.matches(&row) {
                if let Some(pk) = &schema.primary_key {
                    if let Some(key) = row.get(pk) {
                        self.index.delete(table, key);
                    }
                }
                deleted += 1;
            } else {
                kept.push(row);
            }
        }

        self.storage.write_table(table, &kept)?;
        Ok(deleted)
    }

    /// Applies `updates` to every row matching `filter`, revalidating each
    /// mutated row, then persists the full row set once. Returns the number
    /// of rows updated.
    ///
    /// The whole batch is atomic: a validation failure on any matched row,
    /// or a primary-key change colliding with any other row's key, aborts
    /// before anything is persisted, leaving both the on-disk table and the
    /// index untouched. Index entries (including re-keys when the
    /// primary-key value changed) are refreshed only after the write
    /// succeeds.
    pub fn update_rows(&mut self, table: &str, filter: &Condition, updates: &Row) -> Result<usize> {
        let mut rows = self.storage.read_table(table)?;
        let schema = self.schema.get_table_schema(table)?;
        let pk = schema.primary_key.as_deref();

        let mut reindex: Vec<(Value, Row)> = Vec::new();
        let mut updated = 0usize;
        for row in &mut rows {
            if !filter.matches(row) {
                continue;
            }
            let old_key = pk.and_then(|k| row.get(k).cloned());
            for (column, value) in updates {
                // only declared fields change; unknown update columns are
                // ignored, matching the shape the row already has
                if let Some(slot) = row.get_mut(column) {
                    *slot = value.clone();
                }
            }
            schema.validate_row(row)?;
            if let Some(old_key) = old_key {
                reindex.push((old_key, row.clone()));
            }
            updated += 1;
        }

        // Key uniqueness must hold across the whole post-update row set,
        // mutated and untouched rows alike, before anything reaches disk.
        if let Some(pk) = pk {
            let mut seen = HashSet::with_capacity(rows.len());
            for row in &rows {
                if let Some(key) = row.get(pk) {
                    if !seen.insert(key.clone()) {
                        return Err(DbError::DuplicateKey {
                            table: table.to_string(),
                            key: key.clone(),
                        });
                    }
                }
            }
        }

        self.storage.write_table(table, &rows)?;

        if let Some(pk) = pk {
            // All stale entries go first; inserting row by row could trip
            // over the old key of a later re-key in the same batch.
            for (old_key, _) in &reindex {
                self.index.delete(table, old_key);
            }
            for (_, row) in &reindex {
                self.index.insert(table, row, pk)?;
            }
        }
        Ok(updated)
    }

    /// Equality join of two tables on one shared column name, O(|left| ×
    /// |right|). Emits one merged row per matching pair; a pair joins only
    /// when both rows carry the column. On a field-name collision the right
    /// row's value wins.
    pub fn nested_loop_join(
        &self,
        left_table: &str,
        right_table: &str,
        on_column: &str,
    ) -> Result<Vec<Row>> {
        let left_rows = self.storage.read_table(left_table)?;
        let right_rows = self.storage.read_table(right_table)?;

        let mut joined = Vec::new();
        for left in &left_rows {
            for right in &right_rows {
                let (Some(l), Some(r)) = (left.get(on_column), right.get(on_column)) else {
                    continue;
                };
                if l.compare(r) == Some(Ordering::Equal) {
                    let mut merged = left.clone();
                    merged.extend(right.clone());
                    joined.push(merged);
                }
            }
        }
        Ok(joined)
    }

    /// Drops index, storage artifact, then schema, in that fixed order. Any
    /// step's failure aborts without retrying or undoing earlier steps,
    /// asymmetric with [ExecutionEngine::create_table]'s rollback.
    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        self.index.drop_index(table);
        self.storage.delete_table_file(table)?;
        self.schema.drop_table_schema(table)?;
        debug!(table, "table dropped");
        Ok(())
    }

    /// Rebuilds the table's index from storage when its schema declares a
    /// primary key; a no-op otherwise. Run once per table at process start,
    /// and again whenever a stale index needs resynchronizing.
    pub fn load_table_index(&mut self, table: &str) -> Result<()> {
        let schema = self.schema.get_table_schema(table)?;
        if let Some(pk) = &schema.primary_key {
            let rows = self.storage.read_table(table)?;
            self.index.build(table, &rows, pk)?;
        }
        Ok(())
    }

    /// Names of every defined table.
    pub fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.schema.load_all()?.keys().cloned().collect())
    }

    /// The stored schema for `table`.
    pub fn schema_of(&self, table: &str) -> Result<TableSchema> {
        self.schema.get_table_schema(table)
    }
}
