//! Hive-style partitioned dataset writes.
//!
//! [`write_to_dataset`] splits a table on the distinct value combinations
//! of its partition columns and writes one file per combination under
//! `root/col=value/...` directories. Partition columns are carried by the
//! directory names and dropped from the files themselves.

use crate::fs::FileSystem;
use crate::metadata::{self, FileMetadata};
use crate::writer::{FileWriter, WriterOptions};
use crate::{Column, ParquetError, Result, Table};
use log::debug;
use uuid::Uuid;

/// Write `table` under `root`, split on `partition_cols`.
///
/// Rows are grouped by their partition-column value combination; each
/// group becomes one file named with a fresh UUID, so repeated writes
/// into the same dataset never collide. With no partition columns the
/// whole table becomes a single file directly under `root`.
///
/// When `return_metadata` is set, the returned [`FileMetadata`] is the
/// merge of every written file's metadata, with row groups annotated by
/// file paths relative to `root`. A table with rows but no columns left
/// after removing partition columns fails with `NoDataColumns`.
pub fn write_to_dataset<F: FileSystem + ?Sized>(
    table: &Table,
    fs: &F,
    root: &str,
    partition_cols: &[String],
    options: &WriterOptions,
    return_metadata: bool,
) -> Result<Option<FileMetadata>> {
    fs.mkdirs(root)?;

    let mut options = options.clone();
    if options.index_column.is_none() {
        options.index_column = table.index_column().map(str::to_string);
    }

    if partition_cols.is_empty() {
        let filename = fresh_filename();
        let mut file_options = options;
        file_options.metadata_file_path = return_metadata.then(|| filename.clone());
        let path = fs.join(&[root, &filename]);
        let meta = write_one_file(table, fs, &path, file_options)?;
        return Ok(return_metadata.then_some(meta));
    }

    for name in partition_cols {
        table.column(name)?;
    }
    if table.num_columns() == partition_cols.len() {
        return Err(ParquetError::NoDataColumns);
    }

    let order = table.sort_indices_by(partition_cols)?;
    let sorted = table.take(&order);
    let keys: Vec<&Column> = partition_cols
        .iter()
        .map(|name| sorted.column(name))
        .collect::<Result<_>>()?;

    let num_rows = sorted.num_rows();
    let mut collected = Vec::new();
    let mut start = 0;
    for row in 1..=num_rows {
        if row < num_rows && keys.iter().all(|col| col.value(row) == col.value(start)) {
            continue;
        }

        let segments: Vec<String> = partition_cols
            .iter()
            .zip(&keys)
            .map(|(name, col)| format!("{}={}", name, col.value(start)))
            .collect();
        let mut dir_parts = vec![root];
        dir_parts.extend(segments.iter().map(String::as_str));
        let dir = fs.join(&dir_parts);
        fs.mkdirs(&dir)?;

        let filename = fresh_filename();
        let mut rel_parts: Vec<&str> = segments.iter().map(String::as_str).collect();
        rel_parts.push(&filename);
        let rel_path = fs.join(&rel_parts);
        let path = fs.join(&[dir.as_str(), filename.as_str()]);

        let payload = sorted.slice(start..row).drop_columns(partition_cols);
        let mut file_options = options.clone();
        file_options.metadata_file_path = return_metadata.then(|| rel_path.clone());
        if let Some(index) = &file_options.index_column {
            if partition_cols.contains(index) {
                file_options.index_column = None;
            }
        }
        debug!("writing partition {} ({} rows)", rel_path, row - start);
        let meta = write_one_file(&payload, fs, &path, file_options)?;
        if return_metadata {
            collected.push(meta);
        }
        start = row;
    }

    if !return_metadata {
        return Ok(None);
    }
    if collected.is_empty() {
        // Zero rows produce zero partition files
        return Ok(None);
    }
    Ok(Some(metadata::merge_file_metadata(collected)?))
}

fn write_one_file<F: FileSystem + ?Sized>(
    table: &Table,
    fs: &F,
    path: &str,
    options: WriterOptions,
) -> Result<FileMetadata> {
    let sink = fs.create(path)?;
    let mut writer = FileWriter::open(sink, table.schema(), options)?;
    writer.write(table)?;
    writer.close()
}

fn fresh_filename() -> String {
    format!("{}.parquet", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFileSystem;
    use crate::reader::{FileReader, ReadOptions};
    use crate::Value;

    fn sample_table() -> Table {
        Table::try_new(vec![
            ("id".to_string(), Column::from_i64s(vec![1, 2, 3, 4])),
            (
                "grp".to_string(),
                Column::from_strings(vec!["x", "y", "x", "y"]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_partitioned_layout_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let fs = LocalFileSystem;

        let meta = write_to_dataset(
            &sample_table(),
            &fs,
            &root,
            &["grp".to_string()],
            &WriterOptions::default(),
            true,
        )
        .unwrap()
        .unwrap();

        // One file per distinct value, each holding the sorted slice
        // without the partition column
        assert_eq!(meta.num_rows(), 4);
        assert_eq!(meta.num_row_groups(), 2);
        assert_eq!(meta.column_names(), vec!["id".to_string()]);

        for (value, expected) in [("x", vec![1i64, 3]), ("y", vec![2, 4])] {
            let subdir = dir.path().join(format!("grp={}", value));
            let entries: Vec<_> = std::fs::read_dir(&subdir)
                .unwrap()
                .map(|e| e.unwrap().path())
                .collect();
            assert_eq!(entries.len(), 1);
            let reader = FileReader::open_path(&entries[0]).unwrap();
            let table = reader.read(&ReadOptions::default()).unwrap();
            assert_eq!(table.column_names(), vec!["id".to_string()]);
            let ids: Vec<_> = (0..table.num_rows())
                .map(|i| table.column("id").unwrap().value(i))
                .collect();
            let expected: Vec<_> = expected.into_iter().map(Value::Int64).collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn test_unpartitioned_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let fs = LocalFileSystem;

        let meta = write_to_dataset(
            &sample_table(),
            &fs,
            &root,
            &[],
            &WriterOptions::default(),
            true,
        )
        .unwrap()
        .unwrap();
        assert_eq!(meta.num_rows(), 4);
        let rel = meta.file_path.clone().unwrap();
        assert!(rel.ends_with(".parquet"));
        assert!(!rel.contains(std::path::MAIN_SEPARATOR));

        let reader = FileReader::open_path(dir.path().join(&rel)).unwrap();
        assert_eq!(reader.num_rows(), 4);
    }

    #[test]
    fn test_no_data_columns() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let err = write_to_dataset(
            &sample_table(),
            &LocalFileSystem,
            &root,
            &["id".to_string(), "grp".to_string()],
            &WriterOptions::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ParquetError::NoDataColumns));
    }

    #[test]
    fn test_unknown_partition_column() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let err = write_to_dataset(
            &sample_table(),
            &LocalFileSystem,
            &root,
            &["missing".to_string()],
            &WriterOptions::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ParquetError::UnknownColumn(_)));
    }

    #[test]
    fn test_null_partition_values_get_their_own_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let table = Table::try_new(vec![
            ("id".to_string(), Column::from_i64s(vec![1, 2, 3])),
            (
                "grp".to_string(),
                Column::from_opt_strings(vec![Some("x".to_string()), None, Some("x".to_string())]),
            ),
        ])
        .unwrap();

        write_to_dataset(
            &table,
            &LocalFileSystem,
            &root,
            &["grp".to_string()],
            &WriterOptions::default(),
            false,
        )
        .unwrap();

        assert!(dir.path().join("grp=__NULL__").is_dir());
        assert!(dir.path().join("grp=x").is_dir());
    }

    #[test]
    fn test_zero_row_partitioned_write_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let table = sample_table().slice(0..0);
        let meta = write_to_dataset(
            &table,
            &LocalFileSystem,
            &root,
            &["grp".to_string()],
            &WriterOptions::default(),
            true,
        )
        .unwrap();
        assert!(meta.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
