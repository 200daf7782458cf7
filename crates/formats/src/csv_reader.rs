//! CSV reader producing nullable-string records
//!
//! Reads a delimited text file with a header row into [`Record`]s. Cells are
//! decoded as UTF-8 (a leading byte-order marker is dropped) and cells that
//! spell a null token are loaded as null.

use crate::{Error, Record, Result};
use csv::{ByteRecord, ReaderBuilder};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Cell spellings loaded as null
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Configuration for CSV reader
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Field delimiter
    pub delimiter: u8,
    /// Cell values treated as null
    pub null_values: Vec<String>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CsvConfig {
    /// Tab-separated variant of the default configuration
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }

    fn is_null(&self, cell: &str) -> bool {
        self.null_values.iter().any(|n| n == cell)
    }
}

/// CSV reader that yields records after the header row
pub struct CsvReader<R: Read> {
    reader: csv::Reader<R>,
    config: CsvConfig,
    columns: Vec<String>,
    buffer: ByteRecord,
    records_read: usize,
    total_bytes: Option<u64>,
}

impl CsvReader<Box<dyn Read>> {
    /// Open a CSV file, auto-detecting gzip compression
    pub fn open<P: AsRef<Path>>(path: P, config: CsvConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let total_bytes = file.metadata()?.len();

        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => {
                debug!("Opening gzip-compressed CSV file: {:?}", path);
                let reader: Box<dyn Read> = Box::new(GzDecoder::new(file));
                Self::new_with_config(reader, config, None)
            }
            _ => {
                debug!("Opening plain CSV file: {:?}", path);
                let reader: Box<dyn Read> = Box::new(file);
                Self::new_with_config(reader, config, Some(total_bytes))
            }
        }
    }
}

impl<R: Read> CsvReader<R> {
    /// Create a new CSV reader from any Read source
    pub fn new(reader: R) -> Result<Self> {
        Self::new_with_config(reader, CsvConfig::default(), None)
    }

    /// Create a new CSV reader with custom configuration
    ///
    /// The header row is read eagerly; a source without one is rejected.
    pub fn new_with_config(reader: R, config: CsvConfig, total_bytes: Option<u64>) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(config.delimiter)
            .from_reader(reader);

        let headers = reader.byte_headers()?.clone();
        if headers.is_empty() || (headers.len() == 1 && strip_bom(&headers[0]).is_empty()) {
            return Err(Error::InvalidFile("missing header row".to_string()));
        }

        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let field = if i == 0 { strip_bom(field) } else { field };
                std::str::from_utf8(field).map(str::to_string)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            reader,
            config,
            columns,
            buffer: ByteRecord::new(),
            records_read: 0,
            total_bytes,
        })
    }

    /// Column names from the header row
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the number of records read
    pub fn records_processed(&self) -> usize {
        self.records_read
    }

    /// Get the number of bytes consumed so far
    pub fn bytes_processed(&self) -> u64 {
        self.reader.position().byte()
    }

    /// Get total file size if known
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    fn decode_record(&self, line: usize) -> Result<Record> {
        let width = self.columns.len();
        if self.buffer.len() > width {
            return Err(Error::InvalidFile(format!(
                "line {}: expected {} fields, found {}",
                line,
                width,
                self.buffer.len()
            )));
        }
        if self.buffer.len() < width {
            warn!(
                "Line {} has {} fields, header has {}; padding with nulls",
                line,
                self.buffer.len(),
                width
            );
        }

        let mut values = Vec::with_capacity(width);
        for field in self.buffer.iter() {
            let cell = std::str::from_utf8(field)?;
            if self.config.is_null(cell) {
                values.push(None);
            } else {
                values.push(Some(cell.to_string()));
            }
        }
        values.resize(width, None);

        Ok(Record::new(values, line))
    }
}

impl<R: Read> Iterator for CsvReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buffer = std::mem::take(&mut self.buffer);
        let read = self.reader.read_byte_record(&mut buffer);
        self.buffer = buffer;

        match read {
            Ok(false) => None,
            Ok(true) => {
                self.records_read += 1;
                let line = self
                    .buffer
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(self.records_read + 1);
                Some(self.decode_record(line))
            }
            Err(e) => Some(Err(Error::Csv(e))),
        }
    }
}

fn strip_bom(field: &[u8]) -> &[u8] {
    field.strip_prefix(UTF8_BOM).unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_all(data: &[u8]) -> (Vec<String>, Vec<Record>) {
        let reader = CsvReader::new(data).unwrap();
        let columns = reader.columns().to_vec();
        let records = reader.collect::<Result<Vec<_>>>().unwrap();
        (columns, records)
    }

    #[test]
    fn test_csv_reader_basic() {
        let (columns, records) = read_all(b"VIN,Name\nV1,Li\nV2,Wang\n");

        assert_eq!(columns, vec!["VIN", "Name"]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(0), Some("V1"));
        assert_eq!(records[1].get(1), Some("Wang"));
        assert_eq!(records[0].source_line, 2);
        assert_eq!(records[1].source_line, 3);
    }

    #[test]
    fn test_csv_reader_strips_bom() {
        let (columns, _) = read_all("\u{feff}车架号,姓名\nV1,李\n".as_bytes());
        assert_eq!(columns[0], "车架号");
    }

    #[test]
    fn test_csv_reader_null_tokens() {
        let (_, records) = read_all(b"a,b,c,d\n,NULL,NA,x\n");

        assert!(records[0].is_null(0));
        assert!(records[0].is_null(1));
        assert!(records[0].is_null(2));
        assert_eq!(records[0].get(3), Some("x"));
    }

    #[test]
    fn test_csv_reader_pads_short_rows() {
        let (_, records) = read_all(b"a,b,c\n1\n");
        assert_eq!(records[0].len(), 3);
        assert!(records[0].is_null(2));
    }

    #[test]
    fn test_csv_reader_rejects_long_rows() {
        let reader = CsvReader::new(&b"a,b\n1,2,3\n"[..]).unwrap();
        let result: Result<Vec<_>> = reader.collect();
        assert!(matches!(result, Err(Error::InvalidFile(_))));
    }

    #[test]
    fn test_csv_reader_invalid_utf8() {
        let result = CsvReader::new(&b"a,b\n\xff\xfe,1\n"[..])
            .unwrap()
            .collect::<Result<Vec<_>>>();
        assert!(matches!(result, Err(Error::Encoding(_))));
    }

    #[test]
    fn test_csv_reader_empty_input() {
        let result = CsvReader::new(&b""[..]);
        assert!(matches!(result, Err(Error::InvalidFile(_))));
    }

    #[test]
    fn test_csv_reader_quoted_fields() {
        let (_, records) = read_all(b"Address,City\n\"12 Road, Unit 3\",Beijing\n");
        assert_eq!(records[0].get(0), Some("12 Road, Unit 3"));
    }

    #[test]
    fn test_csv_reader_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path().with_extension("csv.gz");

        {
            let file = File::create(&temp_path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            writeln!(encoder, "VIN,Name").unwrap();
            writeln!(encoder, "V1,compressed").unwrap();
            encoder.finish().unwrap();
        }

        let reader = CsvReader::open(&temp_path, CsvConfig::default()).unwrap();
        let records: Vec<_> = reader.collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(1), Some("compressed"));

        std::fs::remove_file(temp_path).unwrap();
    }
}
