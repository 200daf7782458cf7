//! Record data structure for a single row of a tabular dataset

use std::hash::Hasher;

/// A single record from a dataset
///
/// Values are positional and line up with the column names of the owning
/// [`Table`](crate::Table). `None` means the cell holds no data, which is
/// distinct from an empty string.
#[derive(Debug, Clone)]
pub struct Record {
    /// Cell values, one per column
    values: Vec<Option<String>>,
    /// Source line number (1-based, header is line 1)
    pub source_line: usize,
    /// Lazily computed hash over every cell
    hash: Option<u64>,
}

impl Record {
    /// Create a new record
    pub fn new(values: Vec<Option<String>>, source_line: usize) -> Self {
        Self {
            values,
            source_line,
            hash: None,
        }
    }

    /// Cell values in column order
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Consume the record, returning its cell values
    pub fn into_values(self) -> Vec<Option<String>> {
        self.values
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at column `idx`; `None` for null cells and out-of-range indices
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    /// Whether the cell at `idx` is null
    pub fn is_null(&self, idx: usize) -> bool {
        self.get(idx).is_none()
    }

    /// Replace the value at column `idx`, invalidating the cached hash
    pub fn set(&mut self, idx: usize, value: Option<String>) {
        if let Some(slot) = self.values.get_mut(idx) {
            *slot = value;
            self.hash = None;
        }
    }

    /// Take the value at column `idx`, leaving null behind
    pub fn take(&mut self, idx: usize) -> Option<String> {
        let taken = self.values.get_mut(idx).and_then(Option::take);
        if taken.is_some() {
            self.hash = None;
        }
        taken
    }

    /// Build a new record holding only the given columns, in the given order
    pub fn select(&self, indices: &[usize]) -> Record {
        let values = indices
            .iter()
            .map(|&idx| self.values.get(idx).cloned().flatten())
            .collect();
        Record::new(values, self.source_line)
    }

    /// Compute and cache the hash for this record
    ///
    /// Null and empty cells hash differently, and so do cells whose
    /// concatenation happens to coincide.
    pub fn compute_hash(&mut self) -> u64 {
        if let Some(h) = self.hash {
            return h;
        }

        let hash = hash_cells(self.values.iter().map(|v| v.as_deref()));
        self.hash = Some(hash);
        hash
    }

    /// Get the cached hash, computing it if necessary
    pub fn get_hash(&mut self) -> u64 {
        self.compute_hash()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.source_line == other.source_line
    }
}

impl Eq for Record {}

/// Hash a sequence of nullable cells with seahash
///
/// Every cell is prefixed with a presence tag and its byte length so that
/// `[None]`, `[Some("")]` and `["a", "b"]` vs `["ab", ""]` never collide by
/// construction.
pub fn hash_cells<'a, I>(cells: I) -> u64
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut hasher = seahash::SeaHasher::new();
    for cell in cells {
        match cell {
            None => hasher.write_u8(0),
            Some(s) => {
                hasher.write_u8(1);
                hasher.write_usize(s.len());
                hasher.write(s.as_bytes());
            }
        }
    }
    hasher.finish()
}
