//! Presence-based filtering for records

/// Filter configuration for presence-based filtering
#[derive(Debug, Clone, Default)]
pub struct PresenceFilterConfig {
    /// Column positions to inspect
    pub field_indices: Vec<usize>,
}

impl PresenceFilterConfig {
    pub fn new(field_indices: Vec<usize>) -> Self {
        Self { field_indices }
    }
}

/// How many of the watched columns hold data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Every watched column is non-null
    Complete,
    /// Some watched columns are null, at least one is not
    Partial,
    /// Every watched column is null
    Empty,
}

/// Classify a record by the presence of its watched columns
///
/// Out-of-range positions count as null. With no watched columns the
/// record is reported as [`Presence::Empty`].
pub fn check_presence(values: &[Option<String>], config: &PresenceFilterConfig) -> Presence {
    let present = config
        .field_indices
        .iter()
        .filter(|&&idx| matches!(values.get(idx), Some(Some(_))))
        .count();

    if present == 0 {
        Presence::Empty
    } else if present == config.field_indices.len() {
        Presence::Complete
    } else {
        Presence::Partial
    }
}
