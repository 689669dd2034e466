//! Engine selection and the top-level read/write entry points.
//!
//! The accelerated engine is this crate's native path. Callers may hand
//! in an alternative [`CpuEngine`] implementation; selecting it logs a
//! performance warning and delegates, mirroring how the accelerated path
//! is always the recommended one.

use crate::dataset;
use crate::fs::LocalFileSystem;
use crate::metadata::FileMetadata;
use crate::reader::{FileReader, ReadOptions};
use crate::writer::{FileWriter, WriterOptions};
use crate::{Result, Table};
use log::warn;
use std::fs::File;
use std::path::Path;

/// A fallback execution engine supplied by the caller.
pub trait CpuEngine {
    fn read(&self, path: &Path, options: &ReadOptions) -> Result<Table>;

    fn write(
        &self,
        table: &Table,
        path: &Path,
        partition_cols: &[String],
        options: &WriterOptions,
        return_metadata: bool,
    ) -> Result<Option<FileMetadata>>;
}

/// Which engine executes a read or write.
#[derive(Default, Clone, Copy)]
pub enum Engine<'a> {
    #[default]
    Accelerated,
    Cpu(&'a dyn CpuEngine),
}

/// Read a Parquet file into a table with the selected engine.
pub fn read_table<P: AsRef<Path>>(path: P, options: &ReadOptions, engine: Engine<'_>) -> Result<Table> {
    match engine {
        Engine::Accelerated => FileReader::open_path(path)?.read(options),
        Engine::Cpu(cpu) => {
            warn!("using the CPU fallback engine for reading; expect reduced throughput");
            cpu.read(path.as_ref(), options)
        }
    }
}

/// Write a table with the selected engine.
///
/// With partition columns, `path` is a dataset root directory; without,
/// it is the output file itself. Metadata is returned only when
/// `return_metadata` is set.
pub fn write_table<P: AsRef<Path>>(
    table: &Table,
    path: P,
    partition_cols: &[String],
    options: &WriterOptions,
    engine: Engine<'_>,
    return_metadata: bool,
) -> Result<Option<FileMetadata>> {
    match engine {
        Engine::Accelerated => {
            if !partition_cols.is_empty() {
                let root = path.as_ref().to_string_lossy().into_owned();
                return dataset::write_to_dataset(
                    table,
                    &LocalFileSystem,
                    &root,
                    partition_cols,
                    options,
                    return_metadata,
                );
            }
            let mut options = options.clone();
            if options.index_column.is_none() {
                options.index_column = table.index_column().map(str::to_string);
            }
            let sink = File::create(path)?;
            let mut writer = FileWriter::open(sink, table.schema(), options)?;
            writer.write(table)?;
            let meta = writer.close()?;
            Ok(return_metadata.then_some(meta))
        }
        Engine::Cpu(cpu) => {
            warn!("using the CPU fallback engine for writing; expect reduced throughput");
            cpu.write(table, path.as_ref(), partition_cols, options, return_metadata)
        }
    }
}

/// Footer-only summary of a file: total rows, row group count, and column
/// names in schema order.
pub fn read_table_metadata<P: AsRef<Path>>(path: P) -> Result<(usize, usize, Vec<String>)> {
    let reader = FileReader::open_path(path)?;
    Ok((
        reader.num_rows(),
        reader.num_row_groups(),
        reader.schema().column_names(),
    ))
}
