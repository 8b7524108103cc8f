use crate::error::{DbError, Result};
use crate::value::Row;
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::debug;

/// Durable byte-level persistence of one ordered row sequence per table.
///
/// Each table lives in a single JSON file under the data directory. Every
/// mutation rewrites the whole file through a temp-then-rename protocol, so a
/// concurrent reader never observes partial content. Whole-file rewrite is
/// O(row count) per mutation; acceptable at this scale, where the tradeoff
/// buys crash consistency without page or log storage.
pub struct StorageEngine {
    data_dir: PathBuf,
}

impl StorageEngine {
    /// Opens a storage engine rooted at `data_dir`, creating the directory
    /// if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Resolves the artifact path for `table`, refusing names that would
    /// escape the data directory.
    fn table_path(&self, table: &str) -> Result<PathBuf> {
        if table.is_empty() || table.contains(['/', '\\', '.']) {
            return Err(DbError::InvalidDefinition(format!(
                "invalid table name '{table}'"
            )));
        }
        Ok(self.data_dir.join(format!("{table}.json")))
    }

    /// Whether a storage artifact exists for `table`.
    pub fn table_exists(&self, table: &str) -> bool {
        self.table_path(table).is_ok_and(|path| path.exists())
    }

    /// Creates an empty row sequence artifact for `table`.
    ///
    /// # Errors
    /// [DbError::TableExists] if an artifact is already present.
    pub fn create_table_file(&self, table: &str) -> Result<()> {
        if self.table_exists(table) {
            return Err(DbError::TableExists(table.to_string()));
        }
        self.write_table(table, &[])
    }

    /// Returns the full ordered row sequence for `table`.
    ///
    /// # Errors
    /// [DbError::TableNotFound] if no artifact exists, [DbError::Corrupt] if
    /// its content does not decode to a well-formed row sequence.
    pub fn read_table(&self, table: &str) -> Result<Vec<Row>> {
        let path = self.table_path(table)?;
        if !path.exists() {
            return Err(DbError::TableNotFound(table.to_string()));
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| DbError::Corrupt {
            table: table.to_string(),
            reason: e.to_string(),
        })
    }

    /// Replaces the entire artifact for `table` with `rows`.
    ///
    /// The rows serialize to a temporary file which is fsynced and then
    /// atomically renamed over the original. On any failure the temp file is
    /// removed and the original artifact is left untouched.
    pub fn write_table(&self, table: &str, rows: &[Row]) -> Result<()> {
        let path = self.table_path(table)?;
        let tmp = path.with_extension("json.tmp");

        let written = (|| -> Result<()> {
            let mut file = File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut file, rows).map_err(std::io::Error::from)?;
            file.sync_all()?;
            fs::rename(&tmp, &path)?;
            Ok(())
        })();

        if written.is_err() {
            let _ = fs::remove_file(&tmp);
            return written;
        }
        debug!(table, rows = rows.len(), "table rewritten");
        Ok(())
    }

    /// Removes the artifact for `table`.
    ///
    /// # Errors
    /// [DbError::TableNotFound] if no artifact exists.
    pub fn delete_table_file(&self, table: &str) -> Result<()> {
        let path = self.table_path(table)?;
        if !path.exists() {
            return Err(DbError::TableNotFound(table.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}
