//! File-level metadata descriptors and the dataset-level merge.
//!
//! A [`FileMetadata`] summarizes one written file: its schema, its row
//! groups (with per-chunk placement and statistics), the footer key-value
//! annotations, and an optional file path relative to a dataset root.
//! Metadata objects are owned by value and merged structurally; inputs
//! are never mutated.

use crate::codec::{ChunkEncoding, Compression};
use crate::{ParquetError, Result, Schema, Value};
use indexmap::IndexMap;

/// Statistics computed by the codec while encoding one column chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkStats {
    /// Smallest non-null value (native ordering; strings byte-lexicographic)
    pub min: Option<Value>,
    /// Largest non-null value
    pub max: Option<Value>,
    pub null_count: u64,
    /// Best-effort; omitted for high-cardinality chunks
    pub distinct_count: Option<u64>,
}

/// Placement and statistics for one column chunk within a row group.
/// Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunkInfo {
    pub name: String,
    pub encoding: ChunkEncoding,
    pub compression: Compression,
    /// Byte offset of the first data page within the file
    pub file_offset: i64,
    pub compressed_size: i64,
    pub num_values: i64,
    pub stats: Option<ChunkStats>,
}

/// One horizontal slice of a file: a row count, total byte size, one
/// chunk per column, and — once merged into dataset metadata — the
/// relative path of the file physically holding the chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroupInfo {
    pub num_rows: usize,
    pub total_byte_size: i64,
    pub columns: Vec<ColumnChunkInfo>,
    pub file_path: Option<String>,
}

/// Metadata for one Parquet file (or, after merging, one dataset).
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    pub schema: Schema,
    pub row_groups: Vec<RowGroupInfo>,
    pub key_values: IndexMap<String, String>,
    /// Path of the described file relative to its dataset root, when the
    /// writer was told one
    pub file_path: Option<String>,
}

impl FileMetadata {
    pub fn num_rows(&self) -> usize {
        self.row_groups.iter().map(|rg| rg.num_rows).sum()
    }

    pub fn num_row_groups(&self) -> usize {
        self.row_groups.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.column_names()
    }
}

/// Combine per-file metadata into one dataset-level metadata object.
///
/// All inputs must share an identical schema. The result's row groups are
/// the concatenation of the inputs' row groups in input order, each
/// annotated with its originating file's relative path, so one merged
/// object can describe row groups stored across many files. A
/// single-element input is returned unchanged. Key-values merge
/// first-wins.
pub fn merge_file_metadata(metadata: Vec<FileMetadata>) -> Result<FileMetadata> {
    let mut inputs = metadata.into_iter();
    let Some(first) = inputs.next() else {
        return Err(ParquetError::schema_mismatch(
            "cannot merge an empty metadata list".to_string(),
        ));
    };
    let mut inputs = inputs.peekable();
    if inputs.peek().is_none() {
        return Ok(first);
    }

    let schema = first.schema.clone();
    let mut row_groups = Vec::with_capacity(first.row_groups.len());
    let mut key_values = IndexMap::new();
    annotate_and_collect(first, &mut row_groups, &mut key_values);

    for meta in inputs {
        if meta.schema != schema {
            return Err(ParquetError::schema_mismatch(format!(
                "file '{}' does not share the merged schema",
                meta.file_path.as_deref().unwrap_or("<unnamed>")
            )));
        }
        annotate_and_collect(meta, &mut row_groups, &mut key_values);
    }

    Ok(FileMetadata {
        schema,
        row_groups,
        key_values,
        file_path: None,
    })
}

fn annotate_and_collect(
    meta: FileMetadata,
    row_groups: &mut Vec<RowGroupInfo>,
    key_values: &mut IndexMap<String, String>,
) {
    let path = meta.file_path.clone();
    for mut rg in meta.row_groups {
        if rg.file_path.is_none() {
            rg.file_path = path.clone();
        }
        row_groups.push(rg);
    }
    for (key, value) in meta.key_values {
        key_values.entry(key).or_insert(value);
    }
}
