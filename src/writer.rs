//! Single-file Parquet writing.
//!
//! A [`FileWriter`] buffers incoming rows, cuts a row group whenever the
//! configured size is reached, and writes the footer only on a successful
//! `close` — an interrupted write never leaves a file claiming to be
//! complete.

use crate::assembler;
use crate::codec::{self, ChunkEncoding, Compression};
use crate::metadata::{FileMetadata, RowGroupInfo};
use crate::{ParquetError, Result, Schema, Table};
use indexmap::IndexMap;
use log::debug;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::file::writer::SerializedFileWriter;
use parquet::format::KeyValue;
use parquet::schema::types::{ColumnPath, TypePtr};
use std::io::Write;

/// Footer key-value entry recording the designated index column
pub(crate) const INDEX_COLUMN_KEY: &str = "index_column";

/// Statistics granularity recorded while writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatisticsLevel {
    None,
    #[default]
    RowGroup,
    Page,
}

impl StatisticsLevel {
    fn to_parquet(self) -> EnabledStatistics {
        match self {
            StatisticsLevel::None => EnabledStatistics::None,
            StatisticsLevel::RowGroup => EnabledStatistics::Chunk,
            StatisticsLevel::Page => EnabledStatistics::Page,
        }
    }
}

/// Configuration for [`FileWriter`].
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub compression: Compression,
    /// Rows buffered before a row group is cut
    pub row_group_size: usize,
    pub statistics: StatisticsLevel,
    /// Path of the output relative to its dataset root; embedded in the
    /// returned [`FileMetadata`] so merged metadata can locate row groups
    pub metadata_file_path: Option<String>,
    /// Column restored as the table's index label on read
    pub index_column: Option<String>,
}

pub const DEFAULT_ROW_GROUP_SIZE: usize = 1_000_000;

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            statistics: StatisticsLevel::default(),
            metadata_file_path: None,
            index_column: None,
        }
    }
}

impl WriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = rows.max(1);
        self
    }

    pub fn with_statistics(mut self, level: StatisticsLevel) -> Self {
        self.statistics = level;
        self
    }

    pub fn with_metadata_file_path<S: Into<String>>(mut self, path: S) -> Self {
        self.metadata_file_path = Some(path.into());
        self
    }

    pub fn with_index_column<S: Into<String>>(mut self, name: S) -> Self {
        self.index_column = Some(name.into());
        self
    }
}

/// Writes one Parquet file from one or more tables sharing a schema.
///
/// The underlying file writer is constructed lazily at the first
/// row-group flush: per-column dictionary enablement is decided from the
/// first row group's data, and the library fixes encoding properties at
/// file construction.
pub struct FileWriter<W: Write + Send> {
    sink: Option<W>,
    writer: Option<SerializedFileWriter<W>>,
    schema: Schema,
    parquet_schema: TypePtr,
    options: WriterOptions,
    buffer: Option<Table>,
    encodings: Vec<ChunkEncoding>,
    row_groups: Vec<RowGroupInfo>,
}

impl<W: Write + Send> std::fmt::Debug for FileWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<W: Write + Send> FileWriter<W> {
    /// Open a writer over a byte sink with a fixed schema.
    ///
    /// Fails with `UnsupportedCategoricalType` for categorical columns,
    /// `UnsupportedType` for columns without a codec, and
    /// `UnknownColumn` when `options.index_column` is not in the schema.
    pub fn open(sink: W, schema: Schema, mut options: WriterOptions) -> Result<Self> {
        let parquet_schema = codec::parquet_schema(&schema)?;
        if let Some(index) = &options.index_column {
            schema.index_of(index)?;
        }
        // A row group holds at least one row
        options.row_group_size = options.row_group_size.max(1);
        Ok(Self {
            sink: Some(sink),
            writer: None,
            schema,
            parquet_schema,
            options,
            buffer: None,
            encodings: Vec::new(),
            row_groups: Vec::new(),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Append a table's rows. May be called multiple times; rows
    /// concatenate in call order.
    pub fn write(&mut self, table: &Table) -> Result<()> {
        if table.schema() != self.schema {
            return Err(ParquetError::schema_mismatch(
                "table schema does not match the schema the writer was opened with".to_string(),
            ));
        }
        match &mut self.buffer {
            Some(buffer) => buffer.append(table)?,
            None => self.buffer = Some(table.clone()),
        }
        while self
            .buffer
            .as_ref()
            .is_some_and(|b| b.num_rows() >= self.options.row_group_size)
        {
            let buffered = self.buffer.take().unwrap_or_else(|| table.slice(0..0));
            let cut = self.options.row_group_size;
            let head = buffered.slice(0..cut);
            if buffered.num_rows() > cut {
                self.buffer = Some(buffered.slice(cut..buffered.num_rows()));
            }
            self.flush_row_group(&head)?;
        }
        Ok(())
    }

    /// Flush any remainder, write the footer, and return the file's
    /// metadata summary. The footer is written last; a file without one
    /// was never successfully closed.
    pub fn close(mut self) -> Result<FileMetadata> {
        if let Some(remainder) = self.buffer.take() {
            if remainder.num_rows() > 0 {
                self.flush_row_group(&remainder)?;
            }
        }
        // A zero-row close still writes a valid footer
        if self.writer.is_none() {
            self.init_writer(None)?;
        }
        if let Some(writer) = self.writer.take() {
            writer.close().map_err(ParquetError::io_other)?;
        }

        let mut key_values = IndexMap::new();
        if let Some(index) = &self.options.index_column {
            key_values.insert(INDEX_COLUMN_KEY.to_string(), index.clone());
        }
        let file_path = self.options.metadata_file_path.clone();
        let mut row_groups = self.row_groups;
        for rg in &mut row_groups {
            rg.file_path = file_path.clone();
        }
        Ok(FileMetadata {
            schema: self.schema,
            row_groups,
            key_values,
            file_path,
        })
    }

    fn flush_row_group(&mut self, table: &Table) -> Result<()> {
        if self.writer.is_none() {
            self.init_writer(Some(table))?;
        }
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ParquetError::io_other("writer has been closed"))?;
        let rg_writer = writer.next_row_group().map_err(ParquetError::io_other)?;
        let collect_stats = self.options.statistics != StatisticsLevel::None;
        let info = assembler::assemble(
            table,
            0..table.num_rows(),
            &self.schema,
            &self.encodings,
            self.options.compression,
            collect_stats,
            rg_writer,
        )?;
        debug!(
            "flushed row group {}: {} rows, {} bytes",
            self.row_groups.len(),
            info.num_rows,
            info.total_byte_size
        );
        self.row_groups.push(info);
        Ok(())
    }

    /// Build the underlying file writer, deciding per-column dictionary
    /// enablement from the sample (the first row group, when present).
    fn init_writer(&mut self, sample: Option<&Table>) -> Result<()> {
        let mut builder = WriterProperties::builder()
            .set_compression(self.options.compression.to_parquet())
            .set_statistics_enabled(self.options.statistics.to_parquet());
        if let Some(index) = &self.options.index_column {
            builder = builder.set_key_value_metadata(Some(vec![KeyValue::new(
                INDEX_COLUMN_KEY.to_string(),
                index.clone(),
            )]));
        }

        self.encodings = match sample {
            Some(table) => table
                .columns()
                .iter()
                .map(|(_, col)| codec::select_encoding(col, 0..col.len()).0)
                .collect(),
            None => vec![ChunkEncoding::Plain; self.schema.len()],
        };
        for (field, encoding) in self.schema.fields().iter().zip(&self.encodings) {
            let enabled = *encoding == ChunkEncoding::Dictionary;
            builder = builder
                .set_column_dictionary_enabled(ColumnPath::from(field.name.as_str()), enabled);
        }

        let sink = self
            .sink
            .take()
            .ok_or_else(|| ParquetError::io_other("writer sink already consumed"))?;
        let writer =
            SerializedFileWriter::new(sink, self.parquet_schema.clone(), builder.build().into())
                .map_err(ParquetError::io_other)?;
        self.writer = Some(writer);
        Ok(())
    }
}
