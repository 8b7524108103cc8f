use crate::data_type::DataType;
use crate::value::Value;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, DbError>;

/// All failure modes surfaced by the engines.
///
/// Errors propagate synchronously to the immediate caller; nothing in the
/// crate retries internally. The only multi-step recovery is the schema
/// rollback in [crate::engine::ExecutionEngine::create_table], which reports
/// [DbError::RollbackFailed] when the compensation itself fails.
#[derive(Debug, Error)]
pub enum DbError {
    /// A table with this name is already defined or stored.
    #[error("table '{0}' already exists")]
    TableExists(String),

    /// No schema or storage artifact exists under this name.
    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    /// A schema definition is self-inconsistent (dangling primary key,
    /// duplicate column, unknown type name).
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// A row lacks a column its schema declares.
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    /// A row carries a column its schema does not declare.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    /// A row value's runtime variant disagrees with the declared type.
    #[error("column '{column}' expects {expected}, got {value:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        value: Value,
    },

    /// A row handed to the index lacks the primary-key column.
    #[error("row in table '{table}' is missing primary key '{column}'")]
    MissingKey { table: String, column: String },

    /// Two rows share a primary-key value, on insert or index build.
    #[error("duplicate primary key {key:?} in table '{table}'")]
    DuplicateKey { table: String, key: Value },

    /// An on-disk row sequence does not decode to well-formed rows.
    #[error("corrupted data for table '{table}': {reason}")]
    Corrupt { table: String, reason: String },

    /// The shared schema store does not decode to a well-formed mapping.
    #[error("corrupted schema store: {0}")]
    CorruptSchema(String),

    /// Storage creation failed after the schema was persisted, and the
    /// compensating schema drop failed too. The schema/storage pair for
    /// `table` is inconsistent on disk.
    #[error(
        "table '{table}' left inconsistent: storage creation failed ({original}) \
         and schema rollback failed ({rollback})"
    )]
    RollbackFailed {
        table: String,
        original: Box<DbError>,
        rollback: Box<DbError>,
    },

    /// A command line could not be tokenized or parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Filesystem failure during read or atomic replace.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
