use crate::data_type::DataType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A row is a flat mapping of column name to value.
///
/// Rows are persisted as JSON objects of plain scalars; the map keeps their
/// serialization deterministic.
pub type Row = BTreeMap<String, Value>;

/// Represents a single data value stored in the database.
///
/// This enum wraps all supported types into a single type that can be passed
/// around the engine. It serializes untagged, so a persisted row reads back
/// from plain JSON scalars: `true` becomes [Value::Bool], `1` becomes
/// [Value::Int], `1.5` becomes [Value::Float], `"a"` becomes [Value::String].
/// The variant order matters for deserialization and must keep `Int` before
/// `Float` so whole numbers stay integral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer value.
    Int(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A UTF-8 string value.
    String(String),
}

impl Value {
    /// Returns the logical [DataType] corresponding to this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Bool,
            Self::Int(_) => DataType::Int,
            Self::Float(_) => DataType::Float,
            Self::String(_) => DataType::String,
        }
    }

    /// Checks this value against a declared column type.
    ///
    /// `Float` columns accept integral values; `Int` and `Bool` never
    /// interchange, so `Bool` is rejected everywhere but `Bool` columns.
    pub fn conforms_to(&self, expected: DataType) -> bool {
        match expected {
            DataType::Int => matches!(self, Self::Int(_)),
            DataType::Float => matches!(self, Self::Int(_) | Self::Float(_)),
            DataType::String => matches!(self, Self::String(_)),
            DataType::Bool => matches!(self, Self::Bool(_)),
        }
    }

    /// Compares two values, coercing across `Int`/`Float` so mixed numeric
    /// columns order naturally. Any other cross-variant pair is incomparable
    /// and returns `None`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(l), Self::Int(r)) => Some(l.cmp(r)),
            (Self::Float(l), Self::Float(r)) => l.partial_cmp(r),
            (Self::Int(l), Self::Float(r)) => (*l as f64).partial_cmp(r),
            (Self::Float(l), Self::Int(r)) => l.partial_cmp(&(*r as f64)),
            (Self::String(l), Self::String(r)) => Some(l.cmp(r)),
            (Self::Bool(l), Self::Bool(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }
}

// Values key the in-memory index map. Equality stays the derived,
// variant-strict one; the float hash normalizes -0.0 so the Hash contract
// holds for the one float pair that compares equal with different bits.
// NaN never equals itself, which keeps it harmless as a map key.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => {
                let f = if *f == 0.0 { 0.0 } else { *f };
                f.to_bits().hash(state);
            }
            Self::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_data_type() {
        assert_eq!(Value::Int(1).data_type(), DataType::Int);
        assert_eq!(Value::Float(1.0).data_type(), DataType::Float);
        assert_eq!(Value::String("x".into()).data_type(), DataType::String);
        assert_eq!(Value::Bool(true).data_type(), DataType::Bool);
    }

    #[test]
    fn test_conforms_to_matrix() {
        // Int requires an integral, non-boolean value
        assert!(Value::Int(1).conforms_to(DataType::Int));
        assert!(!Value::Float(1.0).conforms_to(DataType::Int));
        assert!(!Value::Bool(true).conforms_to(DataType::Int));

        // Float accepts integral or floating, never boolean
        assert!(Value::Float(1.5).conforms_to(DataType::Float));
        assert!(Value::Int(1).conforms_to(DataType::Float));
        assert!(!Value::Bool(false).conforms_to(DataType::Float));

        // String and Bool are exact
        assert!(Value::String("a".into()).conforms_to(DataType::String));
        assert!(!Value::Int(1).conforms_to(DataType::String));
        assert!(Value::Bool(true).conforms_to(DataType::Bool));
        assert!(!Value::Int(1).conforms_to(DataType::Bool));
    }

    #[test]
    fn test_compare_coerces_numerics() {
        assert_eq!(
            Value::Int(1).compare(&Value::Float(1.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Float(0.5).compare(&Value::Int(1)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Int(2).compare(&Value::Int(1)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::String("a".into()).compare(&Value::String("b".into())),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_compare_rejects_mixed_variants() {
        assert_eq!(Value::Int(1).compare(&Value::String("1".into())), None);
        assert_eq!(Value::Bool(true).compare(&Value::Int(1)), None);
    }

    #[test]
    fn test_untagged_serde_round_trip() {
        let values = vec![
            Value::Int(42),
            Value::Float(3.5),
            Value::String("hello".into()),
            Value::Bool(true),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[42,3.5,"hello",true]"#);

        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_whole_numbers_stay_integral() {
        let v: Value = serde_json::from_str("7").unwrap();
        assert_eq!(v, Value::Int(7));
        let v: Value = serde_json::from_str("7.0").unwrap();
        assert_eq!(v, Value::Float(7.0));
    }

    #[test]
    fn test_null_is_not_a_value() {
        assert!(serde_json::from_str::<Value>("null").is_err());
    }

    #[test]
    fn test_hash_keys_are_variant_strict() {
        let mut map = HashMap::new();
        map.insert(Value::Int(1), "int");
        map.insert(Value::Float(1.0), "float");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&Value::Int(1)), Some(&"int"));
    }

    #[test]
    fn test_negative_zero_hashes_like_zero() {
        let mut map = HashMap::new();
        map.insert(Value::Float(0.0), "zero");
        assert_eq!(map.get(&Value::Float(-0.0)), Some(&"zero"));
    }
}
