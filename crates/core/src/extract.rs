//! Extract stage: read the raw dataset and apply canonical column names

use crate::schema;
use crate::{Error, Result};
use fastclean_formats::{read_table, Table};
use std::path::Path;
use tracing::debug;

/// Load the dataset at `path` and rename its columns
///
/// Columns absent from the translation table keep their source names. No
/// row-level validation happens here.
pub fn extract<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let table = read_table(path).map_err(Error::Load)?;
    let table = translate_columns(table);

    debug!(
        "Extracted {} records with {} columns from {:?}",
        table.len(),
        table.columns().len(),
        path
    );
    Ok(table)
}

/// Rename every column found in the fixed translation table
pub fn translate_columns(mut table: Table) -> Table {
    let renamed = table.rename_columns(schema::translate);
    debug!("Renamed {} of {} columns", renamed, table.columns().len());
    table
}
