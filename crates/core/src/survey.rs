//! Streaming tally of critical-field presence
//!
//! Classifies records one at a time as they are read, so a file can be
//! surveyed without loading it into a table.

use crate::schema::{self, CRITICAL_COLUMNS};
use crate::{Error, Result};
use fastclean_filters::presence_filter::{check_presence, Presence, PresenceFilterConfig};
use fastclean_formats::Record;

/// Record counts by critical-field presence
#[derive(Debug, Clone, Default)]
pub struct PresenceTally {
    config: PresenceFilterConfig,
    pub total: usize,
    /// Records with every critical field present
    pub complete: usize,
    /// Records with some, but not all, critical fields null
    pub incomplete: usize,
    /// Records with every critical field null
    pub critically_empty: usize,
}

impl PresenceTally {
    /// Build a tally for a file with these source header labels
    ///
    /// Labels are translated to canonical names first. Fails with a schema
    /// error naming every critical column the header lacks.
    pub fn for_header(columns: &[String]) -> Result<Self> {
        let canonical: Vec<&str> = columns
            .iter()
            .map(|c| schema::translate(c).unwrap_or(c.as_str()))
            .collect();

        let mut indices = Vec::with_capacity(CRITICAL_COLUMNS.len());
        let mut missing = Vec::new();
        for column in CRITICAL_COLUMNS {
            match canonical.iter().position(|c| *c == column) {
                Some(idx) => indices.push(idx),
                None => missing.push(column),
            }
        }
        if !missing.is_empty() {
            return Err(Error::Schema(format!(
                "missing column(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            config: PresenceFilterConfig::new(indices),
            ..Self::default()
        })
    }

    pub fn add(&mut self, record: &Record) {
        self.total += 1;
        match check_presence(record.values(), &self.config) {
            Presence::Complete => self.complete += 1,
            Presence::Partial => self.incomplete += 1,
            Presence::Empty => self.critically_empty += 1,
        }
    }

    /// Records the transform would remove for missing critical fields
    pub fn missing_critical(&self) -> usize {
        self.incomplete + self.critically_empty
    }
}
