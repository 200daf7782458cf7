//! Parquet writer for tables
//!
//! Every column is written as a nullable UTF-8 column, since records carry
//! string cells only. The parquet footer is written when `close()` is
//! called; if this is never called the output file will be corrupt.

use crate::{Error, Record, Result, Table};
use arrow::array::{ArrayRef, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_BATCH_SIZE: usize = 4096;

/// Parquet writer that accumulates records and writes in batches.
pub struct ParquetWriter {
    arrow_writer: ArrowWriter<File>,
    schema: Arc<Schema>,
    /// Records buffered until the next batch flush.
    pending: Vec<Record>,
    batch_size: usize,
}

impl ParquetWriter {
    /// Create (or truncate) a Parquet file at `path` with the given columns.
    pub fn create<P: AsRef<Path>>(path: P, columns: &[String]) -> Result<Self> {
        let file = File::create(path)?;
        let schema = utf8_schema(columns);
        let props = WriterProperties::builder().build();
        let arrow_writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        Ok(Self {
            arrow_writer,
            schema,
            pending: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Buffer a record for writing.  Automatically flushes a batch when the
    /// internal buffer reaches `batch_size`.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.pending.push(record.clone());
        if self.pending.len() >= self.batch_size {
            self.flush_pending()?;
        }
        Ok(())
    }

    /// Flush remaining buffered records and write the parquet footer.
    ///
    /// This **must** be called to produce a valid parquet file.
    pub fn close(mut self) -> Result<()> {
        self.flush_pending()?;
        self.arrow_writer.close()?;
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let batch = records_to_batch(&self.pending, &self.schema)?;
        self.arrow_writer.write(&batch)?;
        self.pending.clear();
        Ok(())
    }
}

/// Write a whole table to `path` as Parquet, overwriting any existing file
pub fn write_parquet<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let mut writer = ParquetWriter::create(path, table.columns())?;
    for record in table.records() {
        writer.write_record(record)?;
    }
    writer.close()
}

fn utf8_schema(columns: &[String]) -> Arc<Schema> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true /* nullable */))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Convert a slice of records to an Arrow `RecordBatch` using `schema`.
fn records_to_batch(records: &[Record], schema: &Arc<Schema>) -> Result<RecordBatch> {
    let num_rows = records.len();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for idx in 0..schema.fields().len() {
        let mut builder = StringBuilder::with_capacity(num_rows, num_rows * 32);
        for record in records {
            match record.get(idx) {
                Some(s) => builder.append_value(s),
                None => builder.append_null(),
            }
        }
        columns.push(Arc::new(builder.finish()));
    }

    RecordBatch::try_new(schema.clone(), columns).map_err(Error::ArrowError)
}
