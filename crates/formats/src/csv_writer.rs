//! CSV writer for tables
//!
//! Output is UTF-8 with a leading byte-order marker, a header row of column
//! names and no index column. Null cells are written as empty fields.

use crate::{Record, Result, Table};
use csv::{Terminator, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV writer that emits the header on creation
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
    width: usize,
    records_written: usize,
}

impl CsvWriter<BufWriter<File>> {
    /// Create (or truncate) the file at `path` and write the header
    pub fn create<P: AsRef<Path>>(path: P, columns: &[String]) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), columns)
    }
}

impl<W: Write> CsvWriter<W> {
    /// Wrap any Write sink and write the byte-order marker and header
    pub fn new(mut sink: W, columns: &[String]) -> Result<Self> {
        sink.write_all(UTF8_BOM)?;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(sink);
        writer.write_record(columns)?;

        Ok(Self {
            writer,
            width: columns.len(),
            records_written: 0,
        })
    }

    /// Write a single record
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let cells = record
            .values()
            .iter()
            .take(self.width)
            .map(|v| v.as_deref().unwrap_or(""));
        self.writer.write_record(cells)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush buffered output and return the underlying sink
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::Error::Io(e.into_error()))
    }
}

/// Write a whole table to `path`, overwriting any existing file
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let mut writer = CsvWriter::create(path, table.columns())?;
    for record in table.records() {
        writer.write_record(record)?;
    }
    let mut sink = writer.finish()?;
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table() -> Table {
        Table::from_records(
            vec!["VIN".to_string(), "Email".to_string(), "City".to_string()],
            vec![
                Record::new(
                    vec![Some("V1".to_string()), None, Some("Xi'an, Shaanxi".to_string())],
                    2,
                ),
                Record::new(vec![Some("V2".to_string()), Some("a@b.cn".to_string()), None], 3),
            ],
        )
    }

    #[test]
    fn test_write_to_buffer() {
        let mut writer = CsvWriter::new(Vec::new(), table().columns()).unwrap();
        for record in table().records() {
            writer.write_record(record).unwrap();
        }
        assert_eq!(writer.records_written(), 2);

        let bytes = writer.finish().unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "VIN,Email,City\nV1,,\"Xi'an, Shaanxi\"\nV2,a@b.cn,\n");
    }

    #[test]
    fn test_write_csv_round_trips_through_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&table(), &path).unwrap();
        let loaded = crate::read_table(&path).unwrap();

        assert_eq!(loaded.columns(), table().columns());
        assert_eq!(loaded.records()[0].get(2), Some("Xi'an, Shaanxi"));
        assert!(loaded.records()[0].is_null(1));
    }

    #[test]
    fn test_write_csv_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale contents that are much longer than the new file").unwrap();

        write_csv(&Table::new(vec!["VIN".to_string()]), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[UTF8_BOM.len()..], b"VIN\n");
    }

    #[test]
    fn test_write_csv_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(write_csv(&table(), &path).is_err());
    }
}
