//! Logical column types and the file schema derived from them.

use crate::{ParquetError, Result};

/// Logical data types carried by a [`crate::Column`].
///
/// The codec encodes and decodes the primitive types. `Categorical` is a
/// dictionary-backed in-memory representation only: the accelerated writer
/// rejects it and callers must decode to `Utf8` first. `List` and `Struct`
/// describe nested data the engine recognizes but has no codec for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    Utf8,
    /// Microseconds since the Unix epoch, UTC-normalized
    TimestampMicros,
    /// Dictionary-encoded strings (in-memory only)
    Categorical,
    List,
    Struct,
}

impl LogicalType {
    /// Get the logical type name for display
    pub fn type_name(&self) -> &'static str {
        match self {
            LogicalType::Bool => "Bool",
            LogicalType::Int32 => "Int32",
            LogicalType::Int64 => "Int64",
            LogicalType::Float32 => "Float32",
            LogicalType::Float64 => "Float64",
            LogicalType::Utf8 => "Utf8",
            LogicalType::TimestampMicros => "TimestampMicros",
            LogicalType::Categorical => "Categorical",
            LogicalType::List => "List",
            LogicalType::Struct => "Struct",
        }
    }

    /// Whether the column-chunk codec can encode this type
    pub fn has_codec(&self) -> bool {
        !matches!(
            self,
            LogicalType::Categorical | LogicalType::List | LogicalType::Struct
        )
    }
}

/// One column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub logical_type: LogicalType,
    pub nullable: bool,
}

impl Field {
    pub fn new<S: Into<String>>(name: S, logical_type: LogicalType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            logical_type,
            nullable,
        }
    }
}

/// Ordered sequence of fields describing a table or a file.
///
/// A schema is immutable once a file has been opened for writing; every
/// subsequent `write` call is validated against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field index by column name
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| ParquetError::UnknownColumn(name.to_string()))
    }

    pub fn field(&self, idx: usize) -> &Field {
        &self.fields[idx]
    }

    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Sub-schema containing the named fields, in schema order.
    ///
    /// Fails with `UnknownColumn` for any name the schema does not carry.
    pub fn project(&self, names: &[String]) -> Result<Schema> {
        for name in names {
            self.index_of(name)?;
        }
        let fields = self
            .fields
            .iter()
            .filter(|f| names.iter().any(|n| n == &f.name))
            .cloned()
            .collect();
        Ok(Schema::new(fields))
    }
}
