use crate::value::{Row, Value};
use std::cmp::Ordering;

/// Comparison operators usable in a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// A filter condition over a single column: `column OP literal`.
///
/// Conditions are plain data rather than closures, so the interpreter can
/// build them from text and the engine can evaluate them without executable
/// callbacks crossing the component boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: CompareOp,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }

    /// Evaluates the condition against one row. Pure, no side effects.
    ///
    /// A row that lacks the column never matches. An incomparable pair
    /// (say, a string against an integer) orders as nothing, so every
    /// operator except `!=` evaluates to false on it.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(actual) = row.get(&self.column) else {
            return false;
        };
        let ord = actual.compare(&self.value);
        match self.op {
            CompareOp::Eq => ord == Some(Ordering::Equal),
            CompareOp::NotEq => ord != Some(Ordering::Equal),
            CompareOp::Lt => ord == Some(Ordering::Less),
            CompareOp::LtEq => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            CompareOp::Gt => ord == Some(Ordering::Greater),
            CompareOp::GtEq => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}
