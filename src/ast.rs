use crate::condition::Condition;
use crate::schema::ColumnDef;
use crate::value::Value;

/// One parsed command line.
#[derive(Debug, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    Insert(Insert),
    Select(Select),
    Update(Update),
    Delete(Delete),
    Join(Join),
    DropTable(String),
}

#[derive(Debug, PartialEq)]
pub struct CreateTable {
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub primary_key: Option<String>,
}

/// Positional insert; values map onto the schema's column order.
#[derive(Debug, PartialEq)]
pub struct Insert {
    pub table: String,
    pub values: Vec<Value>,
}

#[derive(Debug, PartialEq)]
pub enum ColumnsSelect {
    Star,
    Names(Vec<String>),
}

#[derive(Debug, PartialEq)]
pub struct Select {
    pub table: String,
    pub columns: ColumnsSelect,
    pub filter: Option<Condition>,
}

#[derive(Debug, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<(String, Value)>,
    pub filter: Condition,
}

#[derive(Debug, PartialEq)]
pub struct Delete {
    pub table: String,
    pub filter: Condition,
}

#[derive(Debug, PartialEq)]
pub struct Join {
    pub left: String,
    pub right: String,
    pub on_column: String,
}
