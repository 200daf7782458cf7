//! Load stage: persist the clean and invalid tables

use crate::{Error, Result};
use fastclean_formats::{write_csv, write_parquet, Table};
use std::path::Path;
use tracing::debug;

/// File format of the clean output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    /// Parquet for a `.parquet` extension, CSV for anything else
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => OutputFormat::Parquet,
            _ => OutputFormat::Csv,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Write both tables, choosing the clean format from its extension
pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
    clean: &Table,
    clean_path: P,
    invalid: &Table,
    garbage_path: Q,
) -> Result<()> {
    let format = OutputFormat::from_path(clean_path.as_ref());
    load_with_format(clean, clean_path, format, invalid, garbage_path)
}

/// Write the clean table in `format` and the invalid table as CSV
///
/// The clean table is written first; if it fails the garbage file is not
/// touched. Existing files are overwritten.
pub fn load_with_format<P: AsRef<Path>, Q: AsRef<Path>>(
    clean: &Table,
    clean_path: P,
    format: OutputFormat,
    invalid: &Table,
    garbage_path: Q,
) -> Result<()> {
    let clean_path = clean_path.as_ref();
    let garbage_path = garbage_path.as_ref();

    match format {
        OutputFormat::Csv => write_csv(clean, clean_path),
        OutputFormat::Parquet => write_parquet(clean, clean_path),
    }
    .map_err(Error::Write)?;
    debug!(
        "Wrote {} clean records to {:?} as {}",
        clean.len(),
        clean_path,
        format.as_str()
    );

    write_csv(invalid, garbage_path).map_err(Error::Write)?;
    debug!("Wrote {} invalid records to {:?}", invalid.len(), garbage_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastclean_formats::Record;
    use tempfile::tempdir;

    fn sample() -> Table {
        Table::from_records(
            vec!["VIN".to_string(), "Email".to_string()],
            vec![Record::new(vec![Some("V1".to_string()), None], 2)],
        )
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out.PARQUET")), OutputFormat::Parquet);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Csv);
    }

    #[test]
    fn test_load_writes_both_files() {
        let dir = tempdir().unwrap();
        let clean_path = dir.path().join("clean.csv");
        let garbage_path = dir.path().join("garbage.csv");

        load(&sample(), &clean_path, &Table::new(vec!["VIN".to_string()]), &garbage_path).unwrap();

        let clean = std::fs::read(&clean_path).unwrap();
        assert_eq!(clean, b"\xEF\xBB\xBFVIN,Email\nV1,\n");
        let garbage = std::fs::read(&garbage_path).unwrap();
        assert_eq!(garbage, b"\xEF\xBB\xBFVIN\n");
    }

    #[test]
    fn test_load_parquet_clean_output() {
        let dir = tempdir().unwrap();
        let clean_path = dir.path().join("clean.parquet");
        let garbage_path = dir.path().join("garbage.csv");

        load(&sample(), &clean_path, &sample(), &garbage_path).unwrap();

        let clean = std::fs::read(&clean_path).unwrap();
        assert!(clean.starts_with(b"PAR1"));
        assert!(std::fs::read(&garbage_path).unwrap().starts_with(b"\xEF\xBB\xBF"));
    }

    #[test]
    fn test_unwritable_clean_path_is_write_error() {
        let dir = tempdir().unwrap();
        let clean_path = dir.path().join("missing").join("clean.csv");
        let garbage_path = dir.path().join("garbage.csv");

        let result = load(&sample(), &clean_path, &sample(), &garbage_path);

        assert!(matches!(result, Err(Error::Write(_))));
        assert!(!garbage_path.exists());
    }

    #[test]
    fn test_unwritable_garbage_path_is_write_error() {
        let dir = tempdir().unwrap();
        let clean_path = dir.path().join("clean.csv");
        let garbage_path = dir.path().join("missing").join("garbage.csv");

        let result = load(&sample(), &clean_path, &sample(), &garbage_path);

        assert!(matches!(result, Err(Error::Write(_))));
    }
}
