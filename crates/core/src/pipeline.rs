//! Extract, transform and load, run once over a single input file
//!
//! Stages run strictly in sequence and the table is moved from one stage to
//! the next. The first failing stage stops the run; nothing is written unless
//! the transform succeeded.

use crate::extract::extract;
use crate::load::{load_with_format, OutputFormat};
use crate::transform::{transform, TransformStats};
use crate::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pipeline stage, reported to progress callbacks before it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Transform,
    Load,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Extract => "Reading input",
            Stage::Transform => "Cleaning records",
            Stage::Load => "Writing outputs",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pipeline statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Columns in the loaded table
    pub input_columns: usize,
    pub transform: TransformStats,
    /// False for dry runs
    pub outputs_written: bool,
}

impl PipelineStats {
    pub fn total_records(&self) -> usize {
        self.transform.input_records
    }

    /// Share of input records removed as duplicates, as a percentage
    pub fn deduplication_rate(&self) -> f64 {
        if self.transform.input_records > 0 {
            (self.transform.duplicates as f64 / self.transform.input_records as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Share of input records removed for missing critical fields
    pub fn filter_rate(&self) -> f64 {
        if self.transform.input_records > 0 {
            (self.transform.missing_critical() as f64 / self.transform.input_records as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn retention_rate(&self) -> f64 {
        self.transform.retention_rate()
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub clean_output: PathBuf,
    pub clean_format: OutputFormat,
    pub garbage_output: PathBuf,
    /// Run extract and transform only
    pub dry_run: bool,
}

/// Cleaning pipeline over one input file
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage
    pub fn run(&self) -> Result<PipelineStats> {
        self.run_with_progress(|_| {})
    }

    /// Run every stage, calling `on_stage` as each one starts
    pub fn run_with_progress<F: FnMut(Stage)>(&self, mut on_stage: F) -> Result<PipelineStats> {
        on_stage(Stage::Extract);
        let table = extract(&self.config.input)?;
        let input_columns = table.columns().len();

        on_stage(Stage::Transform);
        let output = transform(table)?;

        let mut stats = PipelineStats {
            input_columns,
            transform: output.stats,
            outputs_written: false,
        };

        if self.config.dry_run {
            debug!("Dry run, skipping writes");
            return Ok(stats);
        }

        on_stage(Stage::Load);
        load_with_format(
            &output.clean,
            &self.config.clean_output,
            self.config.clean_format,
            &output.invalid,
            &self.config.garbage_output,
        )?;
        stats.outputs_written = true;

        Ok(stats)
    }
}

/// Builder for pipeline configuration
#[derive(Debug)]
pub struct PipelineBuilder {
    input: PathBuf,
    clean_output: PathBuf,
    clean_format: Option<OutputFormat>,
    garbage_output: Option<PathBuf>,
    dry_run: bool,
}

impl PipelineBuilder {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, clean_output: Q) -> Self {
        Self {
            input: input.into(),
            clean_output: clean_output.into(),
            clean_format: None,
            garbage_output: None,
            dry_run: false,
        }
    }

    /// Override the format implied by the clean output extension
    pub fn clean_format(mut self, format: OutputFormat) -> Self {
        self.clean_format = Some(format);
        self
    }

    /// Defaults to [`removed_path`] of the clean output
    pub fn garbage_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.garbage_output = Some(path.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build_config(self) -> PipelineConfig {
        let clean_format = self
            .clean_format
            .unwrap_or_else(|| OutputFormat::from_path(&self.clean_output));
        let garbage_output = self
            .garbage_output
            .unwrap_or_else(|| removed_path(&self.clean_output));

        PipelineConfig {
            input: self.input,
            clean_output: self.clean_output,
            clean_format,
            garbage_output,
            dry_run: self.dry_run,
        }
    }

    pub fn build(self) -> Pipeline {
        Pipeline::new(self.build_config())
    }
}

/// Derive the garbage path from the clean output path
///
/// The garbage file is always CSV:
///   cleaned.csv     -> cleaned.removed.csv
///   cleaned.parquet -> cleaned.removed.csv
pub fn removed_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let parent = output.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}.removed.csv", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::COLUMN_TRANSLATION;
    use crate::Error;
    use std::fs;
    use tempfile::tempdir;

    const BOM: &str = "\u{feff}";

    fn header() -> String {
        COLUMN_TRANSLATION
            .iter()
            .map(|(source, _)| *source)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// One CSV line from the first six source columns; the rest stay empty
    fn line(vin: &str, name: &str, id: &str, phone: &str, email: &str, province: &str) -> String {
        let mut cells = vec![vin, name, id, phone, email, province];
        cells.resize(COLUMN_TRANSLATION.len(), "");
        cells.join(",")
    }

    fn sample_input() -> String {
        [
            header(),
            line("1M8GDM9A_KP042788", "张三", "110101199003074514", "+86 138-0013-8000", "zhang.san@163.com", "北京"),
            line("", "", "", "", "x@y", "上海"),
            line("V2", "李四", "I2", "tel:139 0000 0000", "user1-noemai-99@foo.com", "广东"),
            line("1M8GDM9A_KP042788", "张三丰", "110101199003074514", "13800138000", "zhang.san@163.com", "北京"),
            line("", "", "", "", "x@y", "上海"),
            line("1M8GDM9A_KP042788", "", "", "", "x@y", "天津"),
        ]
        .join("\n")
            + "\n"
    }

    #[test]
    fn test_removed_path() {
        assert_eq!(
            removed_path(Path::new("/data/cleaned.csv")),
            PathBuf::from("/data/cleaned.removed.csv")
        );
        assert_eq!(
            removed_path(Path::new("cleaned.parquet")),
            PathBuf::from("cleaned.removed.csv")
        );
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineBuilder::new("in.csv", "out/clean.parquet").build_config();

        assert_eq!(config.clean_format, OutputFormat::Parquet);
        assert_eq!(config.garbage_output, PathBuf::from("out/clean.removed.csv"));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        let clean = dir.path().join("clean.csv");
        let garbage = dir.path().join("garbage.csv");
        fs::write(&input, format!("{}{}", BOM, sample_input())).unwrap();

        let stats = PipelineBuilder::new(&input, &clean)
            .garbage_output(&garbage)
            .build()
            .run()
            .unwrap();

        assert!(stats.outputs_written);
        assert_eq!(stats.input_columns, 20);
        assert_eq!(stats.total_records(), 6);
        assert_eq!(stats.transform.critically_empty, 2);
        assert_eq!(stats.transform.incomplete, 1);
        assert_eq!(stats.transform.duplicates, 1);
        assert_eq!(stats.transform.clean_records, 2);
        assert_eq!(stats.transform.invalid_records, 3);
        assert!((stats.deduplication_rate() - 100.0 / 6.0).abs() < 1e-9);
        assert_eq!(stats.filter_rate(), 50.0);

        let clean_text = fs::read_to_string(&clean).unwrap();
        let mut lines = clean_text.lines();
        assert_eq!(
            lines.next().unwrap(),
            format!(
                "{}VIN,Name,ID_Number,Phone,Email,Province,City,Address,Postal_Code,Birthday,Brand,Car_Model,Engine_Number",
                BOM
            )
        );
        assert_eq!(
            lines.next().unwrap(),
            "1M8GDM9A_KP042788,张三,110101199003074514,8613800138000,zhang.san@163.com,北京,,,,,,,"
        );
        assert_eq!(lines.next().unwrap(), "V2,李四,I2,13900000000,,广东,,,,,,,");
        assert_eq!(lines.next(), None);

        let garbage_text = fs::read_to_string(&garbage).unwrap();
        let garbage_lines: Vec<&str> = garbage_text.lines().collect();
        assert_eq!(garbage_lines.len(), 4);
        assert!(garbage_lines[0].starts_with(BOM));
        assert!(garbage_lines[0].ends_with("Engine_Number"));
        assert!(garbage_lines.contains(&",,,,,上海,,,,,,,,,,,,,,"));
        assert!(garbage_lines.contains(&"1M8GDM9A_KP042788,,,,,天津,,,,,,,,,,,,,,"));
        assert!(garbage_lines
            .iter()
            .any(|l| l.starts_with("1M8GDM9A_KP042788,张三丰,")));
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        let clean = dir.path().join("clean.csv");
        fs::write(&input, sample_input()).unwrap();
        let pipeline = PipelineBuilder::new(&input, &clean).build();

        pipeline.run().unwrap();
        let first_clean = fs::read(&clean).unwrap();
        let first_garbage = fs::read(removed_path(&clean)).unwrap();

        pipeline.run().unwrap();
        assert_eq!(fs::read(&clean).unwrap(), first_clean);
        assert_eq!(fs::read(removed_path(&clean)).unwrap(), first_garbage);
    }

    #[test]
    fn test_missing_column_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        let clean = dir.path().join("clean.csv");
        fs::write(&input, "车架号,姓名\nV1,张三\n").unwrap();

        let result = PipelineBuilder::new(&input, &clean).build().run();

        assert!(matches!(result, Err(Error::Schema(_))));
        assert!(!clean.exists());
        assert!(!removed_path(&clean).exists());
    }

    #[test]
    fn test_missing_input_is_load_error() {
        let dir = tempdir().unwrap();
        let mut stages = Vec::new();

        let result = PipelineBuilder::new(dir.path().join("absent.csv"), dir.path().join("clean.csv"))
            .build()
            .run_with_progress(|stage| stages.push(stage));

        assert!(matches!(result, Err(Error::Load(_))));
        assert_eq!(stages, vec![Stage::Extract]);
    }

    #[test]
    fn test_dry_run_skips_load() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        let clean = dir.path().join("clean.csv");
        fs::write(&input, sample_input()).unwrap();
        let mut stages = Vec::new();

        let stats = PipelineBuilder::new(&input, &clean)
            .dry_run(true)
            .build()
            .run_with_progress(|stage| stages.push(stage))
            .unwrap();

        assert!(!stats.outputs_written);
        assert_eq!(stats.transform.clean_records, 2);
        assert_eq!(stages, vec![Stage::Extract, Stage::Transform]);
        assert!(!clean.exists());
    }

    #[test]
    fn test_header_only_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        let clean = dir.path().join("clean.csv");
        fs::write(&input, format!("{}\n", header())).unwrap();

        let stats = PipelineBuilder::new(&input, &clean).build().run().unwrap();

        assert_eq!(stats.total_records(), 0);
        let text = fs::read_to_string(&clean).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
