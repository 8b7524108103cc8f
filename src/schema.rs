use crate::data_type::DataType;
use crate::error::{DbError, Result};
use crate::value::Row;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column definition in a table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// One table's column set, in declaration order, plus an optional primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
    pub primary_key: Option<String>,
}

impl TableSchema {
    /// Finds a column definition by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks that `row` has exactly the declared columns with conforming
    /// types.
    ///
    /// # Errors
    /// [DbError::MissingColumn] for a declared column absent from the row,
    /// [DbError::UnknownColumn] for a row column not declared, and
    /// [DbError::TypeMismatch] when a value's runtime variant disagrees with
    /// the declared type.
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        for col in &self.columns {
            if !row.contains_key(&col.name) {
                return Err(DbError::MissingColumn {
                    column: col.name.clone(),
                });
            }
        }
        for name in row.keys() {
            if self.column(name).is_none() {
                return Err(DbError::UnknownColumn {
                    column: name.clone(),
                });
            }
        }
        for col in &self.columns {
            let value = &row[&col.name];
            if !value.conforms_to(col.data_type) {
                return Err(DbError::TypeMismatch {
                    column: col.name.clone(),
                    expected: col.data_type,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The full persisted mapping of table name to schema.
pub type SchemaStore = BTreeMap<String, TableSchema>;

/// Single source of truth for every table's column set, types, and primary
/// key.
///
/// All definitions live in one shared JSON artifact; every read loads the
/// whole mapping and every write saves it back through the same
/// temp-then-rename protocol the storage engine uses.
pub struct SchemaManager {
    schema_path: PathBuf,
}

impl SchemaManager {
    /// Opens the schema store at `schema_path`, creating an empty one (and
    /// its parent directory) if the file is absent.
    pub fn new(schema_path: impl Into<PathBuf>) -> Result<Self> {
        let schema_path = schema_path.into();
        if !schema_path.exists() {
            if let Some(parent) = schema_path.parent() {
                fs::create_dir_all(parent)?;
            }
            Self::persist(&schema_path, &SchemaStore::new())?;
        }
        Ok(Self { schema_path })
    }

    /// Loads the entire table-name-to-schema mapping.
    ///
    /// # Errors
    /// [DbError::CorruptSchema] if the artifact does not decode.
    pub fn load_all(&self) -> Result<SchemaStore> {
        let bytes = fs::read(&self.schema_path)?;
        serde_json::from_slice(&bytes).map_err(|e| DbError::CorruptSchema(e.to_string()))
    }

    fn save_all(&self, store: &SchemaStore) -> Result<()> {
        Self::persist(&self.schema_path, store)
    }

    fn persist(path: &Path, store: &SchemaStore) -> Result<()> {
        let tmp = path.with_extension("json.tmp");

        let written = (|| -> Result<()> {
            let mut file = File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut file, store).map_err(std::io::Error::from)?;
            file.sync_all()?;
            fs::rename(&tmp, path)?;
            Ok(())
        })();

        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    /// Registers a new table definition and persists the store atomically.
    ///
    /// # Errors
    /// [DbError::TableExists] if the name is taken;
    /// [DbError::InvalidDefinition] for a duplicate column name or a primary
    /// key that is not a declared column.
    pub fn create_table_schema(
        &self,
        table: &str,
        columns: Vec<ColumnDef>,
        primary_key: Option<String>,
    ) -> Result<()> {
        let mut store = self.load_all()?;
        if store.contains_key(table) {
            return Err(DbError::TableExists(table.to_string()));
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(DbError::InvalidDefinition(format!(
                    "duplicate column '{}'",
                    col.name
                )));
            }
        }
        if let Some(pk) = &primary_key {
            if !columns.iter().any(|c| &c.name == pk) {
                return Err(DbError::InvalidDefinition(format!(
                    "primary key '{pk}' is not a declared column"
                )));
            }
        }

        store.insert(
            table.to_string(),
            TableSchema {
                columns,
                primary_key,
            },
        );
        self.save_all(&store)?;
        debug!(table, "schema created");
        Ok(())
    }

    /// Returns the schema for `table`.
    ///
    /// # Errors
    /// [DbError::TableNotFound] if absent.
    pub fn get_table_schema(&self, table: &str) -> Result<TableSchema> {
        self.load_all()?
            .remove(table)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))
    }

    /// Removes the schema for `table` and persists the store atomically.
    ///
    /// # Errors
    /// [DbError::TableNotFound] if absent.
    pub fn drop_table_schema(&self, table: &str) -> Result<()> {
        let mut store = self.load_all()?;
        if store.remove(table).is_none() {
            return Err(DbError::TableNotFound(table.to_string()));
        }
        self.save_all(&store)?;
        debug!(table, "schema dropped");
        Ok(())
    }

    /// Whether a schema exists for `table`.
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.load_all()?.contains_key(table))
    }

    /// Validates `row` against the stored schema for `table`.
    pub fn validate_row(&self, table: &str, row: &Row) -> Result<()> {
        self.get_table_schema(table)?.validate_row(row)
    }
}
