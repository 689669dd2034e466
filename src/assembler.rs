//! Row-group assembly: one horizontal slice of a table becomes one
//! column chunk per schema column, written in schema order.

use crate::codec::{self, ChunkEncoding, Compression};
use crate::metadata::{ColumnChunkInfo, RowGroupInfo};
use crate::{ParquetError, Result, Schema, Table};
use parquet::file::writer::SerializedRowGroupWriter;
use std::io::Write;
use std::ops::Range;

/// Encode `table[range]` as one row group.
///
/// Drives the column-chunk codec once per column, closes the group, and
/// combines the file-level placement (offsets, sizes) reported by the
/// group writer with the statistics the codec computed. Fails with
/// `SchemaMismatch` when the table no longer matches the schema the file
/// was opened with.
pub fn assemble<W: Write + Send>(
    table: &Table,
    range: Range<usize>,
    schema: &Schema,
    encodings: &[ChunkEncoding],
    compression: Compression,
    collect_stats: bool,
    mut rg_writer: SerializedRowGroupWriter<'_, W>,
) -> Result<RowGroupInfo> {
    if table.schema() != *schema {
        return Err(ParquetError::schema_mismatch(
            "table schema changed since the writer was opened".to_string(),
        ));
    }

    let mut stats = Vec::with_capacity(schema.len());
    for (_, column) in table.columns() {
        let col_writer = rg_writer
            .next_column()
            .map_err(ParquetError::io_other)?
            .ok_or_else(|| {
                ParquetError::io_other("row group writer exposed fewer columns than the schema")
            })?;
        let chunk_stats = codec::encode_chunk(column, range.clone(), col_writer, collect_stats)?;
        stats.push(collect_stats.then_some(chunk_stats));
    }

    let rg_meta = rg_writer.close().map_err(ParquetError::io_other)?;

    let columns = schema
        .fields()
        .iter()
        .zip(rg_meta.columns().iter().zip(stats))
        .enumerate()
        .map(|(idx, (field, (chunk_meta, chunk_stats)))| ColumnChunkInfo {
            name: field.name.clone(),
            encoding: encodings.get(idx).copied().unwrap_or(ChunkEncoding::Plain),
            compression,
            file_offset: chunk_meta.data_page_offset(),
            compressed_size: chunk_meta.compressed_size(),
            num_values: chunk_meta.num_values(),
            stats: chunk_stats,
        })
        .collect();

    Ok(RowGroupInfo {
        num_rows: range.len(),
        total_byte_size: rg_meta.total_byte_size(),
        columns,
        file_path: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Column, Value};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;

    #[test]
    fn test_assemble_reports_rows_and_stats() {
        let table = Table::try_new(vec![
            ("id".to_string(), Column::from_i64s(vec![3, 1, 2, 4])),
            (
                "name".to_string(),
                Column::from_opt_strings(vec![
                    Some("a".to_string()),
                    None,
                    Some("b".to_string()),
                    Some("a".to_string()),
                ]),
            ),
        ])
        .unwrap();
        let schema = table.schema();
        let parquet_schema = codec::parquet_schema(&schema).unwrap();
        let props = WriterProperties::builder().build();
        let mut file_writer =
            SerializedFileWriter::new(Vec::new(), parquet_schema, props.into()).unwrap();

        let rg_writer = file_writer.next_row_group().unwrap();
        let info = assemble(
            &table,
            0..4,
            &schema,
            &[ChunkEncoding::Plain, ChunkEncoding::Dictionary],
            Compression::Snappy,
            true,
            rg_writer,
        )
        .unwrap();
        file_writer.close().unwrap();

        assert_eq!(info.num_rows, 4);
        assert_eq!(info.columns.len(), 2);
        let id_stats = info.columns[0].stats.as_ref().unwrap();
        assert_eq!(id_stats.min, Some(Value::Int64(1)));
        assert_eq!(id_stats.max, Some(Value::Int64(4)));
        let name_stats = info.columns[1].stats.as_ref().unwrap();
        assert_eq!(name_stats.null_count, 1);
        assert!(info.columns[1].compressed_size > 0);
    }

    #[test]
    fn test_assemble_detects_schema_drift() {
        let table = Table::try_new(vec![(
            "id".to_string(),
            Column::from_i64s(vec![1, 2]),
        )])
        .unwrap();
        let other_schema = Table::try_new(vec![(
            "id".to_string(),
            Column::from_i32s(vec![1, 2]),
        )])
        .unwrap()
        .schema();

        let parquet_schema = codec::parquet_schema(&other_schema).unwrap();
        let props = WriterProperties::builder().build();
        let mut file_writer =
            SerializedFileWriter::new(Vec::new(), parquet_schema, props.into()).unwrap();
        let rg_writer = file_writer.next_row_group().unwrap();

        let err = assemble(
            &table,
            0..2,
            &other_schema,
            &[ChunkEncoding::Plain],
            Compression::None,
            false,
            rg_writer,
        )
        .unwrap_err();
        assert!(matches!(err, ParquetError::SchemaMismatch(_)));
    }
}
