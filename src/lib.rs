pub mod ast;
pub mod condition;
pub mod data_type;
pub mod engine;
pub mod error;
pub mod index;
pub mod parser;
pub mod schema;
pub mod storage;
pub mod tokenizer;
pub mod value;

pub use condition::{CompareOp, Condition};
pub use data_type::DataType;
pub use engine::ExecutionEngine;
pub use error::{DbError, Result};
pub use index::IndexEngine;
pub use schema::{ColumnDef, SchemaManager, TableSchema};
pub use storage::StorageEngine;
pub use value::{Row, Value};
