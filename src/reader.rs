//! Single-file Parquet reading.
//!
//! [`FileReader`] opens any byte source the footer parser accepts, recovers
//! the logical schema from the footer, and materializes row selections as
//! [`Table`]s. Column projection and row-group selection narrow the work
//! before any chunk is decoded; `skip_rows`/`num_rows` trim rows after.

use crate::codec::{self, ChunkEncoding, Compression};
use crate::metadata::{ColumnChunkInfo, FileMetadata, RowGroupInfo};
use crate::writer::INDEX_COLUMN_KEY;
use crate::{Column, ParquetError, Result, Schema, Table};
use indexmap::IndexMap;
use parquet::file::reader::{ChunkReader, FileReader as ParquetFileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;

/// Row and column selection for one read call.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Columns to materialize, in any order; the result keeps file schema
    /// order. `None` reads every column.
    pub columns: Option<Vec<String>>,
    /// First row group to read; `None` starts at the first
    pub row_group: Option<usize>,
    /// Number of row groups to read; `None` reads through the last
    pub row_group_count: Option<usize>,
    /// Rows to drop from the front of the selection
    pub skip_rows: usize,
    /// Row cap applied after `skip_rows`; `None` keeps all remaining rows
    pub num_rows: Option<usize>,
    /// Restore the index column designation recorded by the writer
    pub use_index_metadata: bool,
    /// Return string columns dictionary-encoded
    pub strings_to_categorical: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            columns: None,
            row_group: None,
            row_group_count: None,
            skip_rows: 0,
            num_rows: None,
            use_index_metadata: true,
            strings_to_categorical: false,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns<S: Into<String>>(mut self, columns: Vec<S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_row_group(mut self, index: usize) -> Self {
        self.row_group = Some(index);
        self
    }

    pub fn with_row_group_count(mut self, count: usize) -> Self {
        self.row_group_count = Some(count);
        self
    }

    pub fn with_skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn with_num_rows(mut self, rows: usize) -> Self {
        self.num_rows = Some(rows);
        self
    }

    pub fn with_strings_to_categorical(mut self, enabled: bool) -> Self {
        self.strings_to_categorical = enabled;
        self
    }

    pub fn with_use_index_metadata(mut self, enabled: bool) -> Self {
        self.use_index_metadata = enabled;
        self
    }
}

/// Reads one Parquet file.
pub struct FileReader<R: ChunkReader + 'static> {
    reader: SerializedFileReader<R>,
    schema: Schema,
    key_values: IndexMap<String, String>,
}

impl<R: ChunkReader + 'static> std::fmt::Debug for FileReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileReader")
            .field("schema", &self.schema)
            .field("key_values", &self.key_values)
            .finish_non_exhaustive()
    }
}

impl FileReader<File> {
    /// Open a file on the local filesystem.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::try_new(File::open(path)?)
    }
}

impl<R: ChunkReader + 'static> FileReader<R> {
    /// Open a byte source and parse its footer.
    ///
    /// An unparseable footer surfaces as `CorruptFooter`; a parseable
    /// footer describing column shapes the codec cannot decode surfaces
    /// as `UnsupportedType`.
    pub fn try_new(source: R) -> Result<Self> {
        let reader = SerializedFileReader::new(source)
            .map_err(|e| ParquetError::corrupt_footer(e.to_string()))?;
        let file_meta = reader.metadata().file_metadata();
        let schema = Schema::new(
            file_meta
                .schema_descr()
                .columns()
                .iter()
                .map(|descr| codec::field_from_parquet(descr))
                .collect::<Result<Vec<_>>>()?,
        );
        let mut key_values = IndexMap::new();
        if let Some(kvs) = file_meta.key_value_metadata() {
            for kv in kvs {
                if let Some(value) = &kv.value {
                    key_values.insert(kv.key.clone(), value.clone());
                }
            }
        }
        Ok(Self {
            reader,
            schema,
            key_values,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.reader.metadata().file_metadata().num_rows() as usize
    }

    pub fn num_row_groups(&self) -> usize {
        self.reader.metadata().num_row_groups()
    }

    /// Footer key-value annotations (values only; entries without a value
    /// are dropped at open).
    pub fn key_values(&self) -> &IndexMap<String, String> {
        &self.key_values
    }

    /// Materialize the selection described by `options` as a table.
    pub fn read(&self, options: &ReadOptions) -> Result<Table> {
        let projected = match &options.columns {
            Some(names) => self.schema.project(names)?,
            None => self.schema.clone(),
        };

        let total_groups = self.num_row_groups();
        let start = options.row_group.unwrap_or(0);
        // An explicitly selected start group must exist
        if options.row_group.is_some() && start >= total_groups {
            return Err(ParquetError::schema_mismatch(format!(
                "row group {} requested but the file holds {}",
                start, total_groups
            )));
        }
        let count = options.row_group_count.unwrap_or(total_groups - start);
        if start + count > total_groups {
            return Err(ParquetError::schema_mismatch(format!(
                "row groups {}..{} requested but the file holds {}",
                start,
                start + count,
                total_groups
            )));
        }

        let mut columns: Vec<(String, Column)> = projected
            .fields()
            .iter()
            .map(|f| {
                Column::empty(f.logical_type, f.nullable).map(|c| (f.name.clone(), c))
            })
            .collect::<Result<_>>()?;

        for group in start..start + count {
            let group_rows = self.reader.metadata().row_group(group).num_rows() as usize;
            let rg_reader = self
                .reader
                .get_row_group(group)
                .map_err(|e| ParquetError::corrupt_chunk(e.to_string()))?;
            for (name, column) in &mut columns {
                let field_idx = self.schema.index_of(name)?;
                let chunk_reader = rg_reader
                    .get_column_reader(field_idx)
                    .map_err(|e| ParquetError::corrupt_chunk(e.to_string()))?;
                let chunk =
                    codec::decode_chunk(chunk_reader, self.schema.field(field_idx), group_rows)?;
                column.append(&chunk)?;
            }
        }

        let mut table = Table::try_new(columns)?;

        let total_rows = table.num_rows();
        if options.skip_rows > 0 || options.num_rows.is_some() {
            let offset = options.skip_rows.min(total_rows);
            let end = match options.num_rows {
                Some(n) => (offset + n).min(total_rows),
                None => total_rows,
            };
            table = table.slice(offset..end);
        }

        if options.strings_to_categorical {
            table = dictionary_encode_strings(table)?;
        }

        if options.use_index_metadata {
            if let Some(index) = self.key_values.get(INDEX_COLUMN_KEY) {
                if table.column(index).is_ok() {
                    table.set_index_column(Some(index.clone()));
                }
            }
        }

        Ok(table)
    }

    /// Summarize the file from its footer alone; no chunk is decoded.
    ///
    /// Chunk statistics are not recovered from the footer, so `stats` is
    /// absent on every chunk.
    pub fn metadata(&self) -> Result<FileMetadata> {
        let parquet_meta = self.reader.metadata();
        let mut row_groups = Vec::with_capacity(parquet_meta.num_row_groups());
        for group in 0..parquet_meta.num_row_groups() {
            let rg_meta = parquet_meta.row_group(group);
            let columns = self
                .schema
                .fields()
                .iter()
                .zip(rg_meta.columns())
                .map(|(field, chunk)| {
                    let dictionary = chunk.encodings().iter().any(|e| {
                        matches!(
                            e,
                            parquet::basic::Encoding::RLE_DICTIONARY
                                | parquet::basic::Encoding::PLAIN_DICTIONARY
                        )
                    });
                    let compression = match chunk.compression() {
                        parquet::basic::Compression::UNCOMPRESSED => Compression::None,
                        parquet::basic::Compression::SNAPPY => Compression::Snappy,
                        parquet::basic::Compression::GZIP(_) => Compression::Gzip,
                        other => {
                            return Err(ParquetError::corrupt_chunk(format!(
                                "column '{}' uses unrecognized compression {}",
                                field.name, other
                            )))
                        }
                    };
                    Ok(ColumnChunkInfo {
                        name: field.name.clone(),
                        encoding: if dictionary {
                            ChunkEncoding::Dictionary
                        } else {
                            ChunkEncoding::Plain
                        },
                        compression,
                        file_offset: chunk.data_page_offset(),
                        compressed_size: chunk.compressed_size(),
                        num_values: chunk.num_values(),
                        stats: None,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            row_groups.push(RowGroupInfo {
                num_rows: rg_meta.num_rows() as usize,
                total_byte_size: rg_meta.total_byte_size(),
                columns,
                file_path: None,
            });
        }
        Ok(FileMetadata {
            schema: self.schema.clone(),
            row_groups,
            key_values: self.key_values.clone(),
            file_path: None,
        })
    }
}

fn dictionary_encode_strings(table: Table) -> Result<Table> {
    let index = table.index_column().map(str::to_string);
    let columns = table
        .columns()
        .iter()
        .map(|(name, col)| {
            let col = match col.data() {
                crate::ColumnData::Utf8(_) => col.to_categorical()?,
                _ => col.clone(),
            };
            Ok((name.clone(), col))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut table = Table::try_new(columns)?;
    table.set_index_column(index);
    Ok(table)
}
