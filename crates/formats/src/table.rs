//! In-memory table: ordered column names plus ordered records

use crate::Record;
use serde_json::{Map, Value};

/// An ordered sequence of records sharing one column set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Create a table from columns and records
    ///
    /// Records shorter than the column list are padded with nulls, longer
    /// ones are truncated, so every record lines up with `columns`.
    pub fn from_records(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut table = Self::new(columns);
        table.records.reserve(records.len());
        for record in records {
            table.push(record);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the table, returning its columns and records
    pub fn into_parts(self) -> (Vec<String>, Vec<Record>) {
        (self.columns, self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of the first column named `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a record, normalizing its width to the column count
    pub fn push(&mut self, record: Record) {
        let width = self.columns.len();
        if record.len() == width {
            self.records.push(record);
            return;
        }

        let source_line = record.source_line;
        let mut values = record.into_values();
        values.resize(width, None);
        self.records.push(Record::new(values, source_line));
    }

    /// Rename columns through `lookup`; names it returns `None` for are kept
    pub fn rename_columns<F>(&mut self, mut lookup: F) -> usize
    where
        F: FnMut(&str) -> Option<&'static str>,
    {
        let mut renamed = 0;
        for column in &mut self.columns {
            if let Some(canonical) = lookup(column) {
                if column != canonical {
                    *column = canonical.to_string();
                    renamed += 1;
                }
            }
        }
        renamed
    }

    /// Project the table onto `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Table {
        let columns = indices
            .iter()
            .filter_map(|&idx| self.columns.get(idx).cloned())
            .collect();
        let records = self.records.iter().map(|r| r.select(indices)).collect();
        Table { columns, records }
    }

    /// Render a record as a JSON object keyed by column name
    ///
    /// Null cells become JSON `null`.
    pub fn record_to_json(&self, record: &Record) -> Value {
        let map: Map<String, Value> = self
            .columns
            .iter()
            .zip(record.values())
            .map(|(column, value)| {
                let value = match value {
                    Some(s) => Value::String(s.clone()),
                    None => Value::Null,
                };
                (column.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}
