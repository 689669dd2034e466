use bytes::Bytes;
use parquet_dataset::codec::Compression;
use parquet_dataset::reader::{FileReader, ReadOptions};
use parquet_dataset::writer::{FileWriter, WriterOptions};
use parquet_dataset::{Column, LogicalType, Table, Value};

fn all_types_table() -> Table {
    Table::try_new(vec![
        (
            "flag".to_string(),
            Column::from_bools(vec![true, false, true, false, true]),
        ),
        (
            "small".to_string(),
            Column::from_opt_i32s(vec![Some(1), None, Some(-3), Some(7), None]),
        ),
        (
            "big".to_string(),
            Column::from_i64s(vec![10, 20, 30, 40, 50]),
        ),
        (
            "ratio".to_string(),
            Column::from_opt_f32s(vec![Some(0.5), Some(1.5), None, Some(-2.25), Some(8.0)]),
        ),
        (
            "score".to_string(),
            Column::from_opt_f64s(vec![None, Some(99.5), Some(12.25), None, Some(-0.5)]),
        ),
        (
            "label".to_string(),
            Column::from_opt_strings(vec![
                Some("alpha".to_string()),
                Some("beta".to_string()),
                None,
                Some("alpha".to_string()),
                Some("gamma".to_string()),
            ]),
        ),
        (
            "seen_at".to_string(),
            Column::from_opt_timestamps(vec![
                Some(1_609_459_200_000_000),
                None,
                Some(1_612_137_600_000_000),
                Some(1_614_556_800_000_000),
                Some(0),
            ]),
        ),
    ])
    .unwrap()
}

fn write_bytes(table: &Table, options: WriterOptions) -> Bytes {
    let mut buffer = Vec::new();
    {
        let mut writer = FileWriter::open(&mut buffer, table.schema(), options).unwrap();
        writer.write(table).unwrap();
        writer.close().unwrap();
    }
    Bytes::from(buffer)
}

fn assert_tables_equal(expected: &Table, actual: &Table) {
    assert_eq!(expected.column_names(), actual.column_names());
    assert_eq!(expected.num_rows(), actual.num_rows());
    for (name, col) in expected.columns() {
        let other = actual.column(name).unwrap();
        for row in 0..col.len() {
            assert_eq!(
                col.value(row),
                other.value(row),
                "column '{}' differs at row {}",
                name,
                row
            );
        }
    }
}

#[test]
fn test_all_types_roundtrip() {
    let table = all_types_table();
    let bytes = write_bytes(&table, WriterOptions::default());
    let reader = FileReader::try_new(bytes).unwrap();
    let back = reader.read(&ReadOptions::default()).unwrap();
    assert_tables_equal(&table, &back);
}

#[test]
fn test_schema_recovered_from_footer() {
    let table = all_types_table();
    let bytes = write_bytes(&table, WriterOptions::default());
    let reader = FileReader::try_new(bytes).unwrap();

    let schema = reader.schema();
    assert_eq!(schema.field(0).logical_type, LogicalType::Bool);
    assert!(!schema.field(0).nullable);
    assert_eq!(schema.field(1).logical_type, LogicalType::Int32);
    assert!(schema.field(1).nullable);
    assert_eq!(schema.field(6).logical_type, LogicalType::TimestampMicros);
}

#[test]
fn test_roundtrip_across_row_groups() {
    let table = all_types_table();
    let bytes = write_bytes(&table, WriterOptions::default().with_row_group_size(2));
    let reader = FileReader::try_new(bytes).unwrap();
    assert_eq!(reader.num_row_groups(), 3);
    let back = reader.read(&ReadOptions::default()).unwrap();
    assert_tables_equal(&table, &back);
}

#[test]
fn test_roundtrip_each_compression() {
    let table = all_types_table();
    for compression in [Compression::None, Compression::Snappy, Compression::Gzip] {
        let bytes = write_bytes(
            &table,
            WriterOptions::default().with_compression(compression),
        );
        let reader = FileReader::try_new(bytes).unwrap();
        let back = reader.read(&ReadOptions::default()).unwrap();
        assert_tables_equal(&table, &back);
    }
}

#[test]
fn test_multi_write_concatenates() {
    let table = all_types_table();
    let mut buffer = Vec::new();
    {
        let mut writer =
            FileWriter::open(&mut buffer, table.schema(), WriterOptions::default()).unwrap();
        writer.write(&table).unwrap();
        writer.write(&table).unwrap();
        writer.close().unwrap();
    }
    let reader = FileReader::try_new(Bytes::from(buffer)).unwrap();
    let back = reader.read(&ReadOptions::default()).unwrap();
    assert_eq!(back.num_rows(), 10);
    assert_eq!(back.column("big").unwrap().value(5), Value::Int64(10));
}

#[test]
fn test_zero_row_file_roundtrip() {
    let table = all_types_table().slice(0..0);
    let bytes = write_bytes(&table, WriterOptions::default());
    let reader = FileReader::try_new(bytes).unwrap();
    assert_eq!(reader.num_rows(), 0);
    let back = reader.read(&ReadOptions::default()).unwrap();
    assert_eq!(back.num_rows(), 0);
    assert_eq!(back.column_names(), table.column_names());
}

#[test]
fn test_all_null_column_roundtrip() {
    let table = Table::try_new(vec![
        ("id".to_string(), Column::from_i64s(vec![1, 2, 3])),
        (
            "gone".to_string(),
            Column::from_opt_strings(vec![None, None, None]),
        ),
    ])
    .unwrap();
    let bytes = write_bytes(&table, WriterOptions::default());
    let reader = FileReader::try_new(bytes).unwrap();
    let back = reader.read(&ReadOptions::default()).unwrap();
    let gone = back.column("gone").unwrap();
    assert_eq!(gone.null_count(), 3);
    assert_eq!(gone.value(1), Value::Null);
}
