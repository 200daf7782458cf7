//! Configuration file support for the cleaning pipeline
//!
//! The file only names paths and the clean output format. The validation
//! policy itself is fixed and cannot be configured.

use anyhow::{Context, Result};
use fastclean_core::{OutputFormat, PipelineBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Clean output path
    pub path: PathBuf,
    /// Clean output format; inferred from the extension when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatType>,
    /// Garbage output path; derived from the clean path when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garbage: Option<PathBuf>,
}

/// Clean output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Csv,
    Parquet,
}

impl From<FormatType> for OutputFormat {
    fn from(format: FormatType) -> Self {
        match format {
            FormatType::Csv => OutputFormat::Csv,
            FormatType::Parquet => OutputFormat::Parquet,
        }
    }
}

/// Values given on the command line, which take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CleanArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub garbage: Option<PathBuf>,
    pub dry_run: bool,
}

impl PipelineConfig {
    /// Load configuration from a file (YAML or TOML)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            _ => Err(anyhow::anyhow!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                extension
            )),
        }
    }

    /// Merge command-line values over this config into a pipeline builder
    pub fn into_builder(self, args: CleanArgs) -> Result<PipelineBuilder> {
        let (config_output, format, config_garbage) = match self.output {
            Some(output) => (Some(output.path), output.format, output.garbage),
            None => (None, None, None),
        };

        let input = args
            .input
            .or(self.input.map(|i| i.path))
            .context("No input file given; pass --input or set input.path in the config")?;
        let output = args
            .output
            .or(config_output)
            .context("No output file given; pass --output or set output.path in the config")?;

        let mut builder = PipelineBuilder::new(input, output).dry_run(args.dry_run);
        if let Some(format) = format {
            builder = builder.clean_format(format.into());
        }
        if let Some(garbage) = args.garbage.or(config_garbage) {
            builder = builder.garbage_output(garbage);
        }
        Ok(builder)
    }
}
