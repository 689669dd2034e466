//! In-memory columnar table model.
//!
//! A [`Table`] owns its [`Column`]s exclusively; every column holds the
//! same number of rows. Columns are dense typed buffers plus an optional
//! validity bitmap — null slots hold the type's default value so slicing
//! and gathering never branch on validity.

use crate::{Field, LogicalType, ParquetError, Result, Schema, Value};
use ordered_float::OrderedFloat;
use std::ops::Range;
use std::sync::Arc;

/// Typed value buffer for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Bool(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
    /// Microseconds since the Unix epoch
    Timestamp(Vec<i64>),
    /// Distinct values stored once plus per-row indices into them.
    /// In-memory representation only; the accelerated writer rejects it.
    Categorical {
        codes: Vec<i32>,
        dictionary: Vec<String>,
    },
}

/// One column: a typed buffer and an optional validity bitmap.
///
/// Length is fixed at construction. A column built through one of the
/// `from_opt_*` constructors is nullable even when it happens to contain
/// no nulls.
#[derive(Debug, Clone)]
pub struct Column {
    data: ColumnData,
    validity: Option<Vec<bool>>,
}

impl Column {
    pub fn new(data: ColumnData, validity: Option<Vec<bool>>) -> Result<Self> {
        if let Some(v) = &validity {
            let len = data_len(&data);
            if v.len() != len {
                return Err(ParquetError::schema_mismatch(format!(
                    "validity bitmap has {} entries but column has {} rows",
                    v.len(),
                    len
                )));
            }
        }
        Ok(Self { data, validity })
    }

    pub fn from_bools(values: Vec<bool>) -> Self {
        Self {
            data: ColumnData::Bool(values),
            validity: None,
        }
    }

    pub fn from_i32s(values: Vec<i32>) -> Self {
        Self {
            data: ColumnData::Int32(values),
            validity: None,
        }
    }

    pub fn from_i64s(values: Vec<i64>) -> Self {
        Self {
            data: ColumnData::Int64(values),
            validity: None,
        }
    }

    pub fn from_f32s(values: Vec<f32>) -> Self {
        Self {
            data: ColumnData::Float32(values),
            validity: None,
        }
    }

    pub fn from_f64s(values: Vec<f64>) -> Self {
        Self {
            data: ColumnData::Float64(values),
            validity: None,
        }
    }

    pub fn from_strings<S: Into<String>>(values: Vec<S>) -> Self {
        Self {
            data: ColumnData::Utf8(values.into_iter().map(Into::into).collect()),
            validity: None,
        }
    }

    pub fn from_timestamps(micros: Vec<i64>) -> Self {
        Self {
            data: ColumnData::Timestamp(micros),
            validity: None,
        }
    }

    pub fn from_opt_bools(values: Vec<Option<bool>>) -> Self {
        let (data, validity) = split_nulls(values);
        Self {
            data: ColumnData::Bool(data),
            validity: Some(validity),
        }
    }

    pub fn from_opt_i32s(values: Vec<Option<i32>>) -> Self {
        let (data, validity) = split_nulls(values);
        Self {
            data: ColumnData::Int32(data),
            validity: Some(validity),
        }
    }

    pub fn from_opt_i64s(values: Vec<Option<i64>>) -> Self {
        let (data, validity) = split_nulls(values);
        Self {
            data: ColumnData::Int64(data),
            validity: Some(validity),
        }
    }

    pub fn from_opt_f32s(values: Vec<Option<f32>>) -> Self {
        let (data, validity) = split_nulls(values);
        Self {
            data: ColumnData::Float32(data),
            validity: Some(validity),
        }
    }

    pub fn from_opt_f64s(values: Vec<Option<f64>>) -> Self {
        let (data, validity) = split_nulls(values);
        Self {
            data: ColumnData::Float64(data),
            validity: Some(validity),
        }
    }

    pub fn from_opt_strings(values: Vec<Option<String>>) -> Self {
        let (data, validity) = split_nulls(values);
        Self {
            data: ColumnData::Utf8(data),
            validity: Some(validity),
        }
    }

    pub fn from_opt_timestamps(micros: Vec<Option<i64>>) -> Self {
        let (data, validity) = split_nulls(micros);
        Self {
            data: ColumnData::Timestamp(data),
            validity: Some(validity),
        }
    }

    /// A zero-row column of the given type
    pub fn empty(logical_type: LogicalType, nullable: bool) -> Result<Self> {
        let data = match logical_type {
            LogicalType::Bool => ColumnData::Bool(Vec::new()),
            LogicalType::Int32 => ColumnData::Int32(Vec::new()),
            LogicalType::Int64 => ColumnData::Int64(Vec::new()),
            LogicalType::Float32 => ColumnData::Float32(Vec::new()),
            LogicalType::Float64 => ColumnData::Float64(Vec::new()),
            LogicalType::Utf8 => ColumnData::Utf8(Vec::new()),
            LogicalType::TimestampMicros => ColumnData::Timestamp(Vec::new()),
            LogicalType::Categorical => ColumnData::Categorical {
                codes: Vec::new(),
                dictionary: Vec::new(),
            },
            other => {
                return Err(ParquetError::unsupported_type(format!(
                    "cannot materialize empty column of type {}",
                    other.type_name()
                )))
            }
        };
        let validity = nullable.then(Vec::new);
        Ok(Self { data, validity })
    }

    pub fn len(&self) -> usize {
        data_len(&self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn validity(&self) -> Option<&[bool]> {
        self.validity.as_deref()
    }

    pub fn nullable(&self) -> bool {
        self.validity.is_some()
    }

    pub fn logical_type(&self) -> LogicalType {
        match &self.data {
            ColumnData::Bool(_) => LogicalType::Bool,
            ColumnData::Int32(_) => LogicalType::Int32,
            ColumnData::Int64(_) => LogicalType::Int64,
            ColumnData::Float32(_) => LogicalType::Float32,
            ColumnData::Float64(_) => LogicalType::Float64,
            ColumnData::Utf8(_) => LogicalType::Utf8,
            ColumnData::Timestamp(_) => LogicalType::TimestampMicros,
            ColumnData::Categorical { .. } => LogicalType::Categorical,
        }
    }

    /// Whether the row at `idx` holds a value
    pub fn is_valid(&self, idx: usize) -> bool {
        match &self.validity {
            Some(v) => v[idx],
            None => true,
        }
    }

    pub fn null_count(&self) -> usize {
        match &self.validity {
            Some(v) => v.iter().filter(|ok| !**ok).count(),
            None => 0,
        }
    }

    /// The value at `idx`, or `Value::Null` when the slot is invalid
    pub fn value(&self, idx: usize) -> Value {
        if !self.is_valid(idx) {
            return Value::Null;
        }
        match &self.data {
            ColumnData::Bool(v) => Value::Bool(v[idx]),
            ColumnData::Int32(v) => Value::Int32(v[idx]),
            ColumnData::Int64(v) => Value::Int64(v[idx]),
            ColumnData::Float32(v) => Value::Float32(OrderedFloat(v[idx])),
            ColumnData::Float64(v) => Value::Float64(OrderedFloat(v[idx])),
            ColumnData::Utf8(v) => Value::String(Arc::from(v[idx].as_str())),
            ColumnData::Timestamp(v) => Value::Timestamp(v[idx]),
            ColumnData::Categorical { codes, dictionary } => {
                Value::String(Arc::from(dictionary[codes[idx] as usize].as_str()))
            }
        }
    }

    /// Copy out a contiguous row range
    pub fn slice(&self, range: Range<usize>) -> Column {
        let data = match &self.data {
            ColumnData::Bool(v) => ColumnData::Bool(v[range.clone()].to_vec()),
            ColumnData::Int32(v) => ColumnData::Int32(v[range.clone()].to_vec()),
            ColumnData::Int64(v) => ColumnData::Int64(v[range.clone()].to_vec()),
            ColumnData::Float32(v) => ColumnData::Float32(v[range.clone()].to_vec()),
            ColumnData::Float64(v) => ColumnData::Float64(v[range.clone()].to_vec()),
            ColumnData::Utf8(v) => ColumnData::Utf8(v[range.clone()].to_vec()),
            ColumnData::Timestamp(v) => ColumnData::Timestamp(v[range.clone()].to_vec()),
            ColumnData::Categorical { codes, dictionary } => ColumnData::Categorical {
                codes: codes[range.clone()].to_vec(),
                dictionary: dictionary.clone(),
            },
        };
        let validity = self.validity.as_ref().map(|v| v[range].to_vec());
        Column { data, validity }
    }

    /// Gather rows by index, in the order given
    pub fn take(&self, indices: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Bool(v) => ColumnData::Bool(gather(v, indices)),
            ColumnData::Int32(v) => ColumnData::Int32(gather(v, indices)),
            ColumnData::Int64(v) => ColumnData::Int64(gather(v, indices)),
            ColumnData::Float32(v) => ColumnData::Float32(gather(v, indices)),
            ColumnData::Float64(v) => ColumnData::Float64(gather(v, indices)),
            ColumnData::Utf8(v) => ColumnData::Utf8(gather(v, indices)),
            ColumnData::Timestamp(v) => ColumnData::Timestamp(gather(v, indices)),
            ColumnData::Categorical { codes, dictionary } => ColumnData::Categorical {
                codes: gather(codes, indices),
                dictionary: dictionary.clone(),
            },
        };
        let validity = self.validity.as_ref().map(|v| gather(v, indices));
        Column { data, validity }
    }

    /// Append another column's rows; both must carry the same logical type
    pub fn append(&mut self, other: &Column) -> Result<()> {
        let other_len = other.len();
        match (&mut self.data, &other.data) {
            (ColumnData::Bool(a), ColumnData::Bool(b)) => a.extend_from_slice(b),
            (ColumnData::Int32(a), ColumnData::Int32(b)) => a.extend_from_slice(b),
            (ColumnData::Int64(a), ColumnData::Int64(b)) => a.extend_from_slice(b),
            (ColumnData::Float32(a), ColumnData::Float32(b)) => a.extend_from_slice(b),
            (ColumnData::Float64(a), ColumnData::Float64(b)) => a.extend_from_slice(b),
            (ColumnData::Utf8(a), ColumnData::Utf8(b)) => a.extend_from_slice(b),
            (ColumnData::Timestamp(a), ColumnData::Timestamp(b)) => a.extend_from_slice(b),
            (
                ColumnData::Categorical { codes, dictionary },
                ColumnData::Categorical {
                    codes: other_codes,
                    dictionary: other_dict,
                },
            ) => {
                // Remap the incoming codes onto this column's dictionary
                let remap: Vec<i32> = other_dict
                    .iter()
                    .map(|value| {
                        match dictionary.iter().position(|v| v == value) {
                            Some(pos) => pos as i32,
                            None => {
                                dictionary.push(value.clone());
                                (dictionary.len() - 1) as i32
                            }
                        }
                    })
                    .collect();
                codes.extend(other_codes.iter().map(|c| remap[*c as usize]));
            }
            (a, b) => {
                return Err(ParquetError::schema_mismatch(format!(
                    "cannot append {} column to {} column",
                    column_data_type(b).type_name(),
                    column_data_type(a).type_name()
                )))
            }
        }
        match (&mut self.validity, &other.validity) {
            (Some(a), Some(b)) => a.extend_from_slice(b),
            (Some(a), None) => a.extend(std::iter::repeat(true).take(other_len)),
            (None, Some(b)) => {
                let mut v = vec![true; self.len() - other_len];
                v.extend_from_slice(b);
                self.validity = Some(v);
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Convert a string column into its dictionary-encoded categorical
    /// representation. Null positions are preserved.
    pub fn to_categorical(&self) -> Result<Column> {
        let values = match &self.data {
            ColumnData::Utf8(v) => v,
            ColumnData::Categorical { .. } => return Ok(self.clone()),
            other => {
                return Err(ParquetError::unsupported_type(format!(
                    "cannot dictionary-encode {} column",
                    column_data_type(other).type_name()
                )))
            }
        };
        let mut dictionary: Vec<String> = Vec::new();
        let mut codes = Vec::with_capacity(values.len());
        for (idx, value) in values.iter().enumerate() {
            if !self.is_valid(idx) {
                codes.push(0);
                continue;
            }
            let code = match dictionary.iter().position(|v| v == value) {
                Some(pos) => pos as i32,
                None => {
                    dictionary.push(value.clone());
                    (dictionary.len() - 1) as i32
                }
            };
            codes.push(code);
        }
        if dictionary.is_empty() {
            // All-null column still needs one dictionary slot for the
            // placeholder code
            dictionary.push(String::new());
        }
        Ok(Column {
            data: ColumnData::Categorical { codes, dictionary },
            validity: self.validity.clone(),
        })
    }
}

/// Row-value equality: placeholder contents of null slots are ignored.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() || self.logical_type() != other.logical_type() {
            return false;
        }
        (0..self.len()).all(|i| self.value(i) == other.value(i))
    }
}

fn data_len(data: &ColumnData) -> usize {
    match data {
        ColumnData::Bool(v) => v.len(),
        ColumnData::Int32(v) => v.len(),
        ColumnData::Int64(v) => v.len(),
        ColumnData::Float32(v) => v.len(),
        ColumnData::Float64(v) => v.len(),
        ColumnData::Utf8(v) => v.len(),
        ColumnData::Timestamp(v) => v.len(),
        ColumnData::Categorical { codes, .. } => codes.len(),
    }
}

fn column_data_type(data: &ColumnData) -> LogicalType {
    match data {
        ColumnData::Bool(_) => LogicalType::Bool,
        ColumnData::Int32(_) => LogicalType::Int32,
        ColumnData::Int64(_) => LogicalType::Int64,
        ColumnData::Float32(_) => LogicalType::Float32,
        ColumnData::Float64(_) => LogicalType::Float64,
        ColumnData::Utf8(_) => LogicalType::Utf8,
        ColumnData::Timestamp(_) => LogicalType::TimestampMicros,
        ColumnData::Categorical { .. } => LogicalType::Categorical,
    }
}

fn split_nulls<T: Default>(values: Vec<Option<T>>) -> (Vec<T>, Vec<bool>) {
    let mut data = Vec::with_capacity(values.len());
    let mut validity = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Some(v) => {
                data.push(v);
                validity.push(true);
            }
            None => {
                data.push(T::default());
                validity.push(false);
            }
        }
    }
    (data, validity)
}

fn gather<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

/// An ordered collection of equal-length named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
    index_column: Option<String>,
}

impl Table {
    /// Build a table, enforcing the equal-row-count invariant
    pub fn try_new(columns: Vec<(String, Column)>) -> Result<Self> {
        if let Some((_, first)) = columns.first() {
            let len = first.len();
            for (name, col) in &columns {
                if col.len() != len {
                    return Err(ParquetError::schema_mismatch(format!(
                        "column '{}' has {} rows, expected {}",
                        name,
                        col.len(),
                        len
                    )));
                }
            }
        }
        Ok(Self {
            columns,
            index_column: None,
        })
    }

    /// Designate one column as the table's index label
    pub fn with_index_column<S: Into<String>>(mut self, name: S) -> Result<Self> {
        let name = name.into();
        if !self.columns.iter().any(|(n, _)| n == &name) {
            return Err(ParquetError::UnknownColumn(name));
        }
        self.index_column = Some(name);
        Ok(self)
    }

    pub(crate) fn set_index_column(&mut self, name: Option<String>) {
        self.index_column = name;
    }

    pub fn index_column(&self) -> Option<&str> {
        self.index_column.as_deref()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| ParquetError::UnknownColumn(name.to_string()))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Derive the schema from column names and types
    pub fn schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|(name, col)| Field::new(name.clone(), col.logical_type(), col.nullable()))
                .collect(),
        )
    }

    pub fn slice(&self, range: Range<usize>) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.slice(range.clone())))
                .collect(),
            index_column: self.index_column.clone(),
        }
    }

    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.take(indices)))
                .collect(),
            index_column: self.index_column.clone(),
        }
    }

    /// Keep the named columns, in table order
    pub fn project(&self, names: &[String]) -> Result<Table> {
        for name in names {
            self.column(name)?;
        }
        let columns = self
            .columns
            .iter()
            .filter(|(n, _)| names.iter().any(|p| p == n))
            .cloned()
            .collect();
        let index_column = self
            .index_column
            .clone()
            .filter(|idx| names.iter().any(|n| n == idx));
        Ok(Table {
            columns,
            index_column,
        })
    }

    /// Remove the named columns (missing names are ignored)
    pub fn drop_columns(&self, names: &[String]) -> Table {
        let columns: Vec<_> = self
            .columns
            .iter()
            .filter(|(n, _)| !names.iter().any(|d| d == n))
            .cloned()
            .collect();
        let index_column = self
            .index_column
            .clone()
            .filter(|idx| !names.iter().any(|n| n == idx));
        Table {
            columns,
            index_column,
        }
    }

    /// Concatenate another table's rows; schemas must match
    pub fn append(&mut self, other: &Table) -> Result<()> {
        if self.schema() != other.schema() {
            return Err(ParquetError::schema_mismatch(
                "cannot append a table with a different schema".to_string(),
            ));
        }
        for ((_, col), (_, other_col)) in self.columns.iter_mut().zip(other.columns.iter()) {
            col.append(other_col)?;
        }
        Ok(())
    }

    /// Stable row permutation that sorts the table by the named key
    /// columns, comparing values in key order with nulls first.
    pub fn sort_indices_by(&self, keys: &[String]) -> Result<Vec<usize>> {
        let key_cols: Vec<&Column> = keys
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_>>()?;
        let mut indices: Vec<usize> = (0..self.num_rows()).collect();
        indices.sort_by(|&a, &b| {
            for col in &key_cols {
                let ord = col.value(a).cmp(&col.value(b));
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });
        Ok(indices)
    }
}
