use crate::error::DbError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents the supported data types in the database schema.
/// These types define the structure of columns and the expected format of values.
///
/// The serialized names (`"Int"`, `"Float"`, `"String"`, `"Bool"`) are part of
/// the on-disk schema format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// A 64-bit signed integer.
    Int,
    /// A 64-bit floating-point number.
    Float,
    /// A variable-length UTF-8 character string.
    String,
    /// A boolean value (true or false).
    Bool,
}

impl DataType {
    /// The canonical type name as it appears in the schema store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Bool => "Bool",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Int" => Ok(Self::Int),
            "Float" => Ok(Self::Float),
            "String" => Ok(Self::String),
            "Bool" => Ok(Self::Bool),
            other => Err(DbError::InvalidDefinition(format!(
                "invalid data type '{other}', expected one of Int, Float, String, Bool"
            ))),
        }
    }
}
