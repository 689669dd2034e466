//! Parquet codec engine with dataset-level orchestration.
//!
//! The crate is organized in two layers. The codec layer turns in-memory
//! columnar [`Table`]s into Parquet files and back: [`writer::FileWriter`]
//! buffers rows and cuts row groups, [`reader::FileReader`] materializes
//! row and column selections, and [`codec`] holds the per-chunk
//! encode/decode paths shared by both. The orchestration layer sits on
//! top: [`dataset::write_to_dataset`] splits a table across Hive-style
//! `col=value` directories, [`metadata::merge_file_metadata`] combines
//! per-file footer summaries into one dataset-level view, and
//! [`engine`] exposes the top-level entry points with engine selection.
//!
//! # Example
//!
//! ```no_run
//! use parquet_dataset::{Column, Table};
//! use parquet_dataset::writer::WriterOptions;
//! use parquet_dataset::reader::ReadOptions;
//! use parquet_dataset::engine::{read_table, write_table, Engine};
//!
//! # fn main() -> parquet_dataset::Result<()> {
//! let table = Table::try_new(vec![
//!     ("id".to_string(), Column::from_i64s(vec![1, 2, 3])),
//!     ("grp".to_string(), Column::from_strings(vec!["x", "y", "x"])),
//! ])?;
//!
//! // Unpartitioned: one file. With partition columns the path becomes a
//! // dataset root holding grp=x/... and grp=y/... subdirectories.
//! write_table(
//!     &table,
//!     "out.parquet",
//!     &[],
//!     &WriterOptions::default(),
//!     Engine::default(),
//!     false,
//! )?;
//!
//! let back = read_table("out.parquet", &ReadOptions::default(), Engine::default())?;
//! # let _ = back;
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod codec;
pub mod dataset;
pub mod engine;
mod error;
pub mod fs;
pub mod metadata;
pub mod reader;
mod schema;
mod table;
mod value;
pub mod writer;

pub mod test_utils;

pub use error::{ParquetError, Result};
pub use schema::{Field, LogicalType, Schema};
pub use table::{Column, ColumnData, Table};
pub use value::Value;
