//! File format readers and writers for tabular datasets
//!
//! This crate loads delimited text into an in-memory [`Table`] of
//! nullable-string [`Record`]s and writes tables back out as CSV or Parquet.

pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod parquet_writer;
pub mod reader;
pub mod record;
pub mod table;

pub use csv_writer::{write_csv, CsvWriter};
pub use error::{Error, Result};
pub use parquet_writer::{write_parquet, ParquetWriter};
pub use reader::{open_dataset, read_table, DatasetReader};
pub use record::Record;
pub use table::Table;
