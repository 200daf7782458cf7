//! Unified dataset reader abstraction
//!
//! Provides a common interface for reading tabular datasets with automatic
//! format detection based on file extensions.

use crate::csv_reader::{CsvConfig, CsvReader};
use crate::{Error, Record, Result, Table};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Trait for dataset readers providing unified interface
pub trait DatasetReader: Iterator<Item = Result<Record>> {
    /// Column names from the dataset header
    fn columns(&self) -> &[String];

    /// Get total file size in bytes if known
    fn total_bytes(&self) -> Option<u64>;

    /// Get number of bytes processed so far
    fn bytes_processed(&self) -> u64;

    /// Get the number of records processed
    fn records_processed(&self) -> usize;
}

/// Delimited-text dataset reader wrapper
pub struct CsvDatasetReader {
    reader: CsvReader<Box<dyn Read>>,
}

impl Iterator for CsvDatasetReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next()
    }
}

impl DatasetReader for CsvDatasetReader {
    fn columns(&self) -> &[String] {
        self.reader.columns()
    }

    fn total_bytes(&self) -> Option<u64> {
        self.reader.total_bytes()
    }

    fn bytes_processed(&self) -> u64 {
        self.reader.bytes_processed()
    }

    fn records_processed(&self) -> usize {
        self.reader.records_processed()
    }
}

/// Factory function to open a dataset with automatic format detection
///
/// Supported formats:
/// - `.tsv` - tab-separated values
/// - `.gz` - gzip-compressed CSV, or TSV when the inner extension is `.tsv`
/// - anything else, including no extension - comma-separated values
pub fn open_dataset<P: AsRef<Path>>(path: P) -> Result<Box<dyn DatasetReader>> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|e| e.to_str());

    debug!(
        "Opening dataset: {:?} (format: {})",
        path,
        extension.unwrap_or("csv")
    );

    let config = match extension {
        Some("tsv") => CsvConfig::tsv(),
        Some("gz") => {
            let inner = path
                .file_stem()
                .map(Path::new)
                .and_then(|stem| stem.extension())
                .and_then(|e| e.to_str());
            match inner {
                Some("tsv") => CsvConfig::tsv(),
                _ => CsvConfig::default(),
            }
        }
        _ => CsvConfig::default(),
    };

    let reader = CsvReader::open(path, config)?;
    Ok(Box::new(CsvDatasetReader { reader }))
}

/// Read a whole dataset into memory
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let reader = open_dataset(path)?;
    let columns = reader.columns().to_vec();
    let records = reader.collect::<Result<Vec<_>>>()?;
    Ok(Table::from_records(columns, records))
}
