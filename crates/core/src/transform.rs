//! Transform stage: sanitize contact fields, drop unusable and duplicate
//! records, and project the clean output
//!
//! Steps run in a fixed order and each one sees the result of the previous:
//!
//! 1. Placeholder emails ("noemail" and its misspellings) become `"NULL"`.
//! 2. Emails that are not `local@domain.tld` (the marker included) become null.
//! 3. Phones keep only their decimal digits.
//! 4. Records with any of VIN, Name, ID_Number or Phone null move to invalid.
//!    Those with all four null are counted as critically empty, the rest as
//!    incomplete.
//! 5. Later records repeating a (VIN, ID_Number, Email) key move to invalid.
//! 6. Clean records are projected onto the 13 output columns.
//! 7. Invalid records are deduplicated by full-row equality.
//!
//! Every input record ends up either in the clean table or in the invalid
//! accumulator. The invalid table keeps the full loaded column set.

use crate::exact_dedup::{partition_duplicates, HashStrategy};
use crate::schema::ResolvedColumns;
use crate::Result;
use fastclean_filters::email;
use fastclean_filters::phone;
use fastclean_filters::presence_filter::{check_presence, Presence, PresenceFilterConfig};
use fastclean_formats::{Record, Table};
use tracing::debug;

/// Counters collected while transforming
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub input_records: usize,
    /// Emails overwritten with the placeholder marker
    pub placeholder_emails: usize,
    /// Non-null emails nulled by validation (placeholders included)
    pub emails_redacted: usize,
    /// Phones whose value changed when stripped to digits
    pub phones_normalized: usize,
    /// Records removed because every critical field was null
    pub critically_empty: usize,
    /// Records removed because some, but not all, critical fields were null
    pub incomplete: usize,
    /// Records removed as later occurrences of an identity key
    pub duplicates: usize,
    /// Rows in the invalid table after its own deduplication
    pub invalid_records: usize,
    pub clean_records: usize,
}

impl TransformStats {
    /// Records removed for missing critical fields, empty or incomplete
    pub fn missing_critical(&self) -> usize {
        self.critically_empty + self.incomplete
    }

    /// Share of input records removed from the clean output, as a percentage
    pub fn removal_rate(&self) -> f64 {
        if self.input_records == 0 {
            0.0
        } else {
            ((self.missing_critical() + self.duplicates) as f64 / self.input_records as f64) * 100.0
        }
    }

    /// Share of input records kept in the clean output, as a percentage
    pub fn retention_rate(&self) -> f64 {
        if self.input_records == 0 {
            0.0
        } else {
            (self.clean_records as f64 / self.input_records as f64) * 100.0
        }
    }
}

/// Result of the transform stage
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Kept records, projected onto the clean output columns
    pub clean: Table,
    /// Removed records with every loaded column, deduplicated
    pub invalid: Table,
    pub stats: TransformStats,
}

/// Run the cleaning steps over a loaded table
///
/// Fails with a schema error before touching any record if a column the
/// steps rely on is missing.
pub fn transform(table: Table) -> Result<TransformOutput> {
    let resolved = ResolvedColumns::resolve(&table)?;
    let (columns, mut records) = table.into_parts();

    let mut stats = TransformStats {
        input_records: records.len(),
        ..TransformStats::default()
    };

    stats.placeholder_emails = replace_placeholder_emails(&mut records, resolved.email);
    stats.emails_redacted = validate_emails(&mut records, resolved.email);
    stats.phones_normalized = normalize_phones(&mut records, resolved.phone);
    debug!(
        "Sanitized contact fields: {} placeholder emails, {} emails redacted, {} phones normalized",
        stats.placeholder_emails, stats.emails_redacted, stats.phones_normalized
    );

    let mut invalid: Vec<Record> = Vec::new();

    let presence = PresenceFilterConfig::new(resolved.critical.clone());
    let mut complete = Vec::with_capacity(records.len());
    for record in records {
        match check_presence(record.values(), &presence) {
            Presence::Complete => complete.push(record),
            Presence::Partial => {
                stats.incomplete += 1;
                invalid.push(record);
            }
            Presence::Empty => {
                stats.critically_empty += 1;
                invalid.push(record);
            }
        }
    }
    debug!(
        "Removed {} critically empty and {} incomplete records",
        stats.critically_empty, stats.incomplete
    );

    let (records, duplicates) =
        partition_duplicates(complete, HashStrategy::Columns(resolved.identity.clone()));
    stats.duplicates = duplicates.len();
    invalid.extend(duplicates);
    debug!("Removed {} duplicate records", stats.duplicates);

    let clean = Table::from_records(columns.clone(), records).select(&resolved.clean);
    stats.clean_records = clean.len();

    let accumulated = invalid.len();
    let (invalid, _) = partition_duplicates(invalid, HashStrategy::FullRecord);
    stats.invalid_records = invalid.len();
    debug!(
        "Invalid table holds {} records ({} repeated rows collapsed)",
        stats.invalid_records,
        accumulated - stats.invalid_records
    );

    Ok(TransformOutput {
        clean,
        invalid: Table::from_records(columns, invalid),
        stats,
    })
}

fn replace_placeholder_emails(records: &mut [Record], idx: usize) -> usize {
    let mut replaced = 0;
    for record in records.iter_mut() {
        let value = record.take(idx);
        if value.as_deref().is_some_and(email::is_placeholder) {
            replaced += 1;
        }
        record.set(idx, email::replace_placeholder(value));
    }
    replaced
}

fn validate_emails(records: &mut [Record], idx: usize) -> usize {
    let mut redacted = 0;
    for record in records.iter_mut() {
        let value = record.take(idx);
        let had_value = value.is_some();
        let kept = email::validate(value);
        if had_value && kept.is_none() {
            redacted += 1;
        }
        record.set(idx, kept);
    }
    redacted
}

fn normalize_phones(records: &mut [Record], idx: usize) -> usize {
    let mut normalized = 0;
    for record in records.iter_mut() {
        let value = record.take(idx);
        let cleaned = phone::normalize(value.clone());
        if cleaned != value {
            normalized += 1;
        }
        record.set(idx, cleaned);
    }
    normalized
}
