//! Column-chunk encode/decode.
//!
//! One chunk is one column's values for one row group. Encoding builds
//! definition levels from the validity bitmap, pushes the dense non-null
//! values through the library's typed column writer, and computes
//! statistics in the same pass; the library handles page layout, value
//! encoding, level run-length encoding, and compression. Decoding drives
//! the typed column reader in reverse and reconstructs null positions
//! from definition levels.

use crate::metadata::ChunkStats;
use crate::{Column, ColumnData, Field, LogicalType, ParquetError, Result, Value};
use parquet::basic::{
    GzipLevel, LogicalType as ParquetLogicalType, Repetition, TimeUnit, Type as PhysicalType,
};
use parquet::column::reader::{ColumnReader, ColumnReaderImpl};
use parquet::data_type::{
    BoolType, ByteArray, ByteArrayType, DataType, DoubleType, FloatType, Int32Type, Int64Type,
};
use parquet::file::writer::SerializedColumnWriter;
use parquet::schema::types::{ColumnDescriptor, Type, TypePtr};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

/// Compression codecs the engine recognizes.
///
/// The codec identifier is stored in each chunk's page headers, so decode
/// dispatches from the file, not from caller configuration; a stored
/// identifier outside this set surfaces as `CorruptChunk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    None,
    #[default]
    Snappy,
    Gzip,
}

impl Compression {
    pub(crate) fn to_parquet(self) -> parquet::basic::Compression {
        match self {
            Compression::None => parquet::basic::Compression::UNCOMPRESSED,
            Compression::Snappy => parquet::basic::Compression::SNAPPY,
            Compression::Gzip => parquet::basic::Compression::GZIP(GzipLevel::default()),
        }
    }
}

/// Value encoding chosen for a column chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkEncoding {
    Plain,
    Dictionary,
}

/// Dictionary encoding is worthwhile when fewer than this fraction of a
/// chunk's rows are distinct.
pub const DICTIONARY_DISTINCT_FRACTION: f64 = 0.5;

/// Count distinct non-null values over the range, giving up once the
/// count can no longer stay under the dictionary threshold.
///
/// Returns the preferred encoding and the distinct count; the count is
/// omitted exactly when the scan gave up, so high-cardinality chunks get
/// plain encoding and no distinct statistic.
pub fn select_encoding(column: &Column, range: Range<usize>) -> (ChunkEncoding, Option<u64>) {
    let total = range.len();
    if total == 0 {
        return (ChunkEncoding::Plain, Some(0));
    }
    let cutoff = (total as f64 * DICTIONARY_DISTINCT_FRACTION).ceil() as usize;
    let mut distinct: HashSet<Value> = HashSet::new();
    for idx in range {
        if !column.is_valid(idx) {
            continue;
        }
        distinct.insert(column.value(idx));
        if distinct.len() >= cutoff {
            return (ChunkEncoding::Plain, None);
        }
    }
    (ChunkEncoding::Dictionary, Some(distinct.len() as u64))
}

/// Map a schema field to its Parquet primitive type.
pub fn parquet_field(field: &Field) -> Result<TypePtr> {
    let (physical, logical) = match field.logical_type {
        LogicalType::Bool => (PhysicalType::BOOLEAN, None),
        LogicalType::Int32 => (PhysicalType::INT32, None),
        LogicalType::Int64 => (PhysicalType::INT64, None),
        LogicalType::Float32 => (PhysicalType::FLOAT, None),
        LogicalType::Float64 => (PhysicalType::DOUBLE, None),
        LogicalType::Utf8 => (PhysicalType::BYTE_ARRAY, Some(ParquetLogicalType::String)),
        LogicalType::TimestampMicros => (
            PhysicalType::INT64,
            Some(ParquetLogicalType::Timestamp {
                is_adjusted_to_u_t_c: true,
                unit: TimeUnit::MICROS(Default::default()),
            }),
        ),
        LogicalType::Categorical => {
            return Err(ParquetError::UnsupportedCategoricalType(field.name.clone()))
        }
        LogicalType::List | LogicalType::Struct => {
            return Err(ParquetError::unsupported_type(format!(
                "column '{}' has type {} which has no codec",
                field.name,
                field.logical_type.type_name()
            )))
        }
    };
    let repetition = if field.nullable {
        Repetition::OPTIONAL
    } else {
        Repetition::REQUIRED
    };
    let parquet_type = Type::primitive_type_builder(&field.name, physical)
        .with_repetition(repetition)
        .with_logical_type(logical)
        .build()
        .map_err(ParquetError::io_other)?;
    Ok(Arc::new(parquet_type))
}

/// Build the Parquet file schema (a root group of primitive fields).
pub fn parquet_schema(schema: &crate::Schema) -> Result<TypePtr> {
    let fields = schema
        .fields()
        .iter()
        .map(parquet_field)
        .collect::<Result<Vec<_>>>()?;
    let root = Type::group_type_builder("schema")
        .with_fields(fields)
        .build()
        .map_err(ParquetError::io_other)?;
    Ok(Arc::new(root))
}

/// Recover a schema field from a footer column descriptor.
///
/// Nested leaves (repeated data or deeper-than-root paths) have no codec
/// here and fail with `UnsupportedType`.
pub fn field_from_parquet(descr: &ColumnDescriptor) -> Result<Field> {
    if descr.max_rep_level() > 0 || descr.path().parts().len() > 1 {
        return Err(ParquetError::unsupported_type(format!(
            "column '{}' is nested",
            descr.path()
        )));
    }
    let logical_type = match descr.physical_type() {
        PhysicalType::BOOLEAN => LogicalType::Bool,
        PhysicalType::INT32 => LogicalType::Int32,
        PhysicalType::INT64 => match descr.logical_type() {
            Some(ParquetLogicalType::Timestamp {
                unit: TimeUnit::MICROS(_),
                ..
            }) => LogicalType::TimestampMicros,
            _ => LogicalType::Int64,
        },
        PhysicalType::FLOAT => LogicalType::Float32,
        PhysicalType::DOUBLE => LogicalType::Float64,
        PhysicalType::BYTE_ARRAY => LogicalType::Utf8,
        other => {
            return Err(ParquetError::unsupported_type(format!(
                "column '{}' has physical type {} which has no codec",
                descr.name(),
                other
            )))
        }
    };
    Ok(Field::new(
        descr.name(),
        logical_type,
        descr.max_def_level() > 0,
    ))
}

/// Encode one column chunk: write `column[range]` through the typed
/// column writer and return the statistics computed along the way.
pub fn encode_chunk(
    column: &Column,
    range: Range<usize>,
    mut writer: SerializedColumnWriter<'_>,
    with_distinct: bool,
) -> Result<ChunkStats> {
    let nullable = column.nullable();
    let def_levels: Option<Vec<i16>> = nullable.then(|| {
        range
            .clone()
            .map(|i| i16::from(column.is_valid(i)))
            .collect()
    });

    match column.data() {
        ColumnData::Bool(values) => write_values::<BoolType, _, _>(
            &mut writer,
            values,
            column,
            range.clone(),
            def_levels.as_deref(),
            |v| *v,
        )?,
        ColumnData::Int32(values) => write_values::<Int32Type, _, _>(
            &mut writer,
            values,
            column,
            range.clone(),
            def_levels.as_deref(),
            |v| *v,
        )?,
        ColumnData::Int64(values) | ColumnData::Timestamp(values) => {
            write_values::<Int64Type, _, _>(
                &mut writer,
                values,
                column,
                range.clone(),
                def_levels.as_deref(),
                |v| *v,
            )?
        }
        ColumnData::Float32(values) => write_values::<FloatType, _, _>(
            &mut writer,
            values,
            column,
            range.clone(),
            def_levels.as_deref(),
            |v| *v,
        )?,
        ColumnData::Float64(values) => write_values::<DoubleType, _, _>(
            &mut writer,
            values,
            column,
            range.clone(),
            def_levels.as_deref(),
            |v| *v,
        )?,
        ColumnData::Utf8(values) => write_values::<ByteArrayType, _, _>(
            &mut writer,
            values,
            column,
            range.clone(),
            def_levels.as_deref(),
            |v| ByteArray::from(v.as_str()),
        )?,
        ColumnData::Categorical { .. } => {
            return Err(ParquetError::UnsupportedCategoricalType(
                "column chunk".to_string(),
            ))
        }
    }
    writer.close().map_err(ParquetError::io_other)?;

    Ok(chunk_stats(column, range, with_distinct))
}

fn write_values<T, V, F>(
    writer: &mut SerializedColumnWriter<'_>,
    values: &[V],
    column: &Column,
    range: Range<usize>,
    def_levels: Option<&[i16]>,
    convert: F,
) -> Result<()>
where
    T: DataType,
    F: Fn(&V) -> T::T,
{
    let dense: Vec<T::T> = range
        .filter(|&i| column.is_valid(i))
        .map(|i| convert(&values[i]))
        .collect();
    writer
        .typed::<T>()
        .write_batch(&dense, def_levels, None)
        .map_err(ParquetError::io_other)?;
    Ok(())
}

/// Min/max (native ordering, byte-lexicographic for strings), null count,
/// and best-effort distinct count for one chunk.
pub fn chunk_stats(column: &Column, range: Range<usize>, with_distinct: bool) -> ChunkStats {
    let mut min: Option<Value> = None;
    let mut max: Option<Value> = None;
    let mut null_count = 0u64;
    for idx in range.clone() {
        if !column.is_valid(idx) {
            null_count += 1;
            continue;
        }
        let value = column.value(idx);
        match &min {
            Some(m) if *m <= value => {}
            _ => min = Some(value.clone()),
        }
        match &max {
            Some(m) if *m >= value => {}
            _ => max = Some(value),
        }
    }
    let distinct_count = if with_distinct {
        select_encoding(column, range).1
    } else {
        None
    };
    ChunkStats {
        min,
        max,
        null_count,
        distinct_count,
    }
}

/// Decode one column chunk back into a [`Column`].
///
/// `num_rows` is the row group's row count; the reconstruction places a
/// type-default value in each null slot and records the position in the
/// validity bitmap, so decode reproduces the exact values and null
/// positions of the encoded column.
pub fn decode_chunk(reader: ColumnReader, field: &Field, num_rows: usize) -> Result<Column> {
    let column = match (reader, field.logical_type) {
        (ColumnReader::BoolColumnReader(r), LogicalType::Bool) => {
            let (values, validity) = read_values(r, field, num_rows)?;
            Column::new(ColumnData::Bool(values), validity)?
        }
        (ColumnReader::Int32ColumnReader(r), LogicalType::Int32) => {
            let (values, validity) = read_values(r, field, num_rows)?;
            Column::new(ColumnData::Int32(values), validity)?
        }
        (ColumnReader::Int64ColumnReader(r), LogicalType::Int64) => {
            let (values, validity) = read_values(r, field, num_rows)?;
            Column::new(ColumnData::Int64(values), validity)?
        }
        (ColumnReader::Int64ColumnReader(r), LogicalType::TimestampMicros) => {
            let (values, validity) = read_values(r, field, num_rows)?;
            Column::new(ColumnData::Timestamp(values), validity)?
        }
        (ColumnReader::FloatColumnReader(r), LogicalType::Float32) => {
            let (values, validity) = read_values(r, field, num_rows)?;
            Column::new(ColumnData::Float32(values), validity)?
        }
        (ColumnReader::DoubleColumnReader(r), LogicalType::Float64) => {
            let (values, validity) = read_values(r, field, num_rows)?;
            Column::new(ColumnData::Float64(values), validity)?
        }
        (ColumnReader::ByteArrayColumnReader(r), LogicalType::Utf8) => {
            let (raw, validity) = read_values(r, field, num_rows)?;
            let values = raw
                .into_iter()
                .map(|b: ByteArray| {
                    std::str::from_utf8(b.data())
                        .map(str::to_string)
                        .map_err(|e| {
                            ParquetError::corrupt_chunk(format!(
                                "column '{}' holds invalid UTF-8: {}",
                                field.name, e
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            Column::new(ColumnData::Utf8(values), validity)?
        }
        (_, logical_type) => {
            return Err(ParquetError::corrupt_chunk(format!(
                "column '{}' physical layout does not match {}",
                field.name,
                logical_type.type_name()
            )))
        }
    };
    Ok(column)
}

/// Drain up to `num_rows` records from a typed column reader, then place
/// the dense values back into row positions using definition levels.
fn read_values<T>(
    mut reader: ColumnReaderImpl<T>,
    field: &Field,
    num_rows: usize,
) -> Result<(Vec<T::T>, Option<Vec<bool>>)>
where
    T: DataType,
    T::T: Clone + Default,
{
    let mut values: Vec<T::T> = Vec::with_capacity(num_rows);
    let mut def_levels: Option<Vec<i16>> = field.nullable.then(|| Vec::with_capacity(num_rows));
    let mut records = 0usize;
    while records < num_rows {
        let (records_read, _, _) = reader
            .read_records(num_rows - records, def_levels.as_mut(), None, &mut values)
            .map_err(|e| {
                ParquetError::corrupt_chunk(format!("column '{}': {}", field.name, e))
            })?;
        if records_read == 0 {
            break;
        }
        records += records_read;
    }
    if records != num_rows {
        return Err(ParquetError::corrupt_chunk(format!(
            "column '{}' holds {} records, row group describes {}",
            field.name, records, num_rows
        )));
    }

    let Some(def_levels) = def_levels else {
        return Ok((values, None));
    };
    // Fast path: optional column with no nulls
    if values.len() == records {
        return Ok((values, Some(vec![true; records])));
    }
    let mut dense = values.into_iter();
    let mut placed: Vec<T::T> = Vec::with_capacity(records);
    let mut validity = Vec::with_capacity(records);
    for &level in &def_levels {
        if level > 0 {
            placed.push(dense.next().ok_or_else(|| {
                ParquetError::corrupt_chunk(format!(
                    "column '{}' definition levels describe more values than present",
                    field.name
                ))
            })?);
            validity.push(true);
        } else {
            placed.push(T::T::default());
            validity.push(false);
        }
    }
    Ok((placed, Some(validity)))
}

/// Statistics bound helper for tests and inspection: the smallest and
/// largest non-null values of a column range as [`Value`]s.
pub fn column_min_max(column: &Column, range: Range<usize>) -> (Option<Value>, Option<Value>) {
    let stats = chunk_stats(column, range, false);
    (stats.min, stats.max)
}
