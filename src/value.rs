use ordered_float::OrderedFloat;
use std::fmt;
use std::sync::Arc;

/// A single scalar value as it appears in a table cell, a partition key,
/// or a column-chunk statistic.
///
/// Floats use [`OrderedFloat`] so values are totally ordered and hashable;
/// this is what lets a tuple of values act as a partition key and lets
/// min/max statistics be computed with one comparison path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),
    String(Arc<str>),
    /// Microseconds since the Unix epoch
    Timestamp(i64),
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::Float32(_) => "Float32",
            Value::Float64(_) => "Float64",
            Value::String(_) => "String",
            Value::Timestamp(_) => "Timestamp",
        }
    }
}

/// Renders the value the way it appears in a `col=value` partition
/// directory segment.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "__NULL__"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v.0),
            Value::Float64(v) => write!(f, "{}", v.0),
            Value::String(s) => write!(f, "{}", s),
            Value::Timestamp(us) => write!(f, "{}", us),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_ordering() {
        assert!(Value::Int64(1) < Value::Int64(2));
        assert!(Value::String(Arc::from("a")) < Value::String(Arc::from("b")));
        // Byte-lexicographic string ordering
        assert!(Value::String(Arc::from("Z")) < Value::String(Arc::from("a")));
        assert!(Value::Float64(OrderedFloat(1.5)) < Value::Float64(OrderedFloat(2.5)));
    }

    #[test]
    fn test_null_sorts_first() {
        assert!(Value::Null < Value::Int64(i64::MIN));
    }

    #[test]
    fn test_display_for_partition_segments() {
        assert_eq!(Value::Int64(7).to_string(), "7");
        assert_eq!(Value::String(Arc::from("x")).to_string(), "x");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_hash_consistency() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Value::Int32(42));
        set.insert(Value::Float64(OrderedFloat(1.25)));
        assert!(set.contains(&Value::Int32(42)));
        assert!(set.contains(&Value::Float64(OrderedFloat(1.25))));
        assert!(!set.contains(&Value::Int32(43)));
    }
}
