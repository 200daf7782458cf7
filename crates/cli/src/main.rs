//! fastclean CLI
//!
//! Cleans a CSV export of personal and vehicle records into a validated,
//! deduplicated dataset plus a file of rejected rows.

mod config;
mod progress;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use fastclean_core::extract::translate_columns;
use fastclean_core::{PipelineConfig as ResolvedConfig, PipelineStats, PresenceTally};
use fastclean_formats::{open_dataset, Table};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{CleanArgs, PipelineConfig};
use progress::{format_with_commas, print_summary_report, StageSpinner};

#[derive(Parser)]
#[command(name = "fastclean")]
#[command(version, about = "Clean, validate and deduplicate personal and vehicle record datasets", long_about = None)]
#[command(author = "fastclean")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output statistics in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run extract, transform and load over a CSV file
    Clean {
        /// Input file (CSV, TSV or gzip-compressed CSV)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Clean output file (.csv, or .parquet for Parquet)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for rejected rows (defaults to <output>.removed.csv)
        #[arg(short, long)]
        garbage: Option<PathBuf>,

        /// Pipeline config file (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show statistics without writing output
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect a dataset file with canonical column names
    Inspect {
        /// Path to the dataset file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Number of records to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Count records by presence of the critical fields
    Count {
        /// Path to the dataset file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(!cli.json) // Disable colors if JSON output
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("An error occurred: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Clean {
            input,
            output,
            garbage,
            config,
            dry_run,
        } => {
            let args = CleanArgs {
                input,
                output,
                garbage,
                dry_run,
            };
            clean(args, config, cli.json)?;
        }
        Commands::Inspect { input, limit } => {
            inspect_dataset(input, limit)?;
        }
        Commands::Count { input } => {
            count_dataset(input, cli.json)?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

fn clean(args: CleanArgs, config_path: Option<PathBuf>, json_output: bool) -> Result<()> {
    let file_config = match config_path {
        Some(path) => {
            debug!("Loading pipeline config from {:?}", path);
            PipelineConfig::load(&path)?
        }
        None => PipelineConfig::default(),
    };

    let pipeline = file_config.into_builder(args)?.build();
    let config = pipeline.config().clone();
    debug!("Input: {:?}", config.input);
    debug!(
        "Clean output: {:?} ({})",
        config.clean_output,
        config.clean_format.as_str()
    );
    debug!("Garbage output: {:?}", config.garbage_output);

    let spinner = if json_output {
        StageSpinner::hidden()
    } else {
        StageSpinner::new()
    };
    let result = pipeline.run_with_progress(|stage| spinner.set_stage(stage));
    spinner.finish();
    let stats = result?;

    info!("Data processing completed successfully.");

    if json_output {
        println!("{}", serde_json::to_string_pretty(&clean_report(&config, &stats))?);
    } else if stats.outputs_written {
        print_summary_report(
            &config.input,
            Some(&config.clean_output),
            Some(&config.garbage_output),
            &stats,
        );
    } else {
        print_summary_report(&config.input, None, None, &stats);
    }

    Ok(())
}

fn clean_report(config: &ResolvedConfig, stats: &PipelineStats) -> serde_json::Value {
    let path_or_null = |path: &PathBuf| {
        if stats.outputs_written {
            serde_json::Value::String(path.to_string_lossy().to_string())
        } else {
            serde_json::Value::Null
        }
    };
    let t = &stats.transform;

    serde_json::json!({
        "input": config.input.to_string_lossy(),
        "output": path_or_null(&config.clean_output),
        "output_format": config.clean_format.as_str(),
        "garbage_output": path_or_null(&config.garbage_output),
        "input_columns": stats.input_columns,
        "total_records": t.input_records,
        "critically_empty": t.critically_empty,
        "incomplete": t.incomplete,
        "duplicates": t.duplicates,
        "invalid_records": t.invalid_records,
        "clean_records": t.clean_records,
        "emails_redacted": t.emails_redacted,
        "placeholder_emails": t.placeholder_emails,
        "phones_normalized": t.phones_normalized,
        "deduplication_rate": stats.deduplication_rate(),
        "filter_rate": stats.filter_rate(),
        "retention_rate": stats.retention_rate(),
    })
}

fn inspect_dataset(input: PathBuf, limit: usize) -> Result<()> {
    debug!("Inspecting dataset: {:?}", input);

    let mut reader = open_dataset(&input)?;
    let header = translate_columns(Table::new(reader.columns().to_vec()));
    let mut count = 0;

    while count < limit {
        let Some(result) = reader.next() else {
            break;
        };
        let record = result?;
        println!(
            "Record #{}: {}",
            record.source_line,
            serde_json::to_string_pretty(&header.record_to_json(&record))?
        );
        count += 1;
    }

    debug!(
        "Processed {} records ({} bytes)",
        reader.records_processed(),
        reader.bytes_processed()
    );

    Ok(())
}

fn count_dataset(input: PathBuf, json_output: bool) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    debug!("Counting records in: {:?}", input);

    let mut reader = open_dataset(&input)?;
    let mut tally = PresenceTally::for_header(reader.columns())?;

    let pb = match reader.total_bytes() {
        Some(total) if !json_output => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
                    .progress_chars("#>-"),
            );
            Some(pb)
        }
        _ => None,
    };

    while let Some(result) = reader.next() {
        tally.add(&result?);

        if let Some(ref pb) = pb {
            pb.set_position(reader.bytes_processed());
        }

        if tally.total % 10000 == 0 {
            debug!("Processed {} records...", tally.total);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    debug!("Processed {} bytes", reader.bytes_processed());

    if json_output {
        println!("{}", serde_json::to_string_pretty(&count_report(&tally))?);
    } else {
        println!("Total records:      {}", format_with_commas(tally.total));
        println!("Complete:           {}", format_with_commas(tally.complete));
        println!("Incomplete:         {}", format_with_commas(tally.incomplete));
        println!("Critically empty:   {}", format_with_commas(tally.critically_empty));
    }

    Ok(())
}

fn count_report(tally: &PresenceTally) -> serde_json::Value {
    serde_json::json!({
        "total_records": tally.total,
        "complete": tally.complete,
        "incomplete": tally.incomplete,
        "critically_empty": tally.critically_empty,
        "missing_critical": tally.missing_critical(),
    })
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastclean_core::PipelineBuilder;
    use fastclean_formats::Record;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_clean_arguments() {
        let cli = Cli::try_parse_from([
            "fastclean", "clean", "-i", "raw.csv", "-o", "clean.parquet", "--dry-run", "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Clean {
                input,
                output,
                garbage,
                dry_run,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("raw.csv")));
                assert_eq!(output, Some(PathBuf::from("clean.parquet")));
                assert_eq!(garbage, None);
                assert!(dry_run);
            }
            _ => panic!("expected clean subcommand"),
        }
    }

    #[test]
    fn test_clean_report_for_dry_run() {
        let config = PipelineBuilder::new("raw.csv", "clean.csv")
            .dry_run(true)
            .build_config();
        let mut stats = PipelineStats::default();
        stats.transform.input_records = 4;
        stats.transform.duplicates = 1;
        stats.transform.clean_records = 3;

        let report = clean_report(&config, &stats);

        assert_eq!(report["output"], serde_json::Value::Null);
        assert_eq!(report["garbage_output"], serde_json::Value::Null);
        assert_eq!(report["total_records"], 4);
        assert_eq!(report["deduplication_rate"], 25.0);
        assert_eq!(report["retention_rate"], 75.0);
    }

    #[test]
    fn test_clean_report_lists_outputs() {
        let config = PipelineBuilder::new("raw.csv", "clean.csv").build_config();
        let stats = PipelineStats {
            outputs_written: true,
            ..PipelineStats::default()
        };

        let report = clean_report(&config, &stats);

        assert_eq!(report["output"], "clean.csv");
        assert_eq!(report["garbage_output"], "clean.removed.csv");
        assert_eq!(report["output_format"], "csv");
    }

    #[test]
    fn test_count_report_splits_missing_rows() {
        let mut tally = PresenceTally::for_header(&[
            "车架号".to_string(),
            "姓名".to_string(),
            "身份证".to_string(),
            "手机".to_string(),
        ])
        .unwrap();
        tally.add(&Record::new(
            vec![Some("V1".into()), Some("Li".into()), Some("I1".into()), Some("138".into())],
            2,
        ));
        tally.add(&Record::new(
            vec![Some("1M8GDM9A_KP042788".into()), None, None, None],
            3,
        ));
        tally.add(&Record::new(vec![None, None, None, None], 4));

        let report = count_report(&tally);

        assert_eq!(report["total_records"], 3);
        assert_eq!(report["complete"], 1);
        assert_eq!(report["incomplete"], 1);
        assert_eq!(report["critically_empty"], 1);
        assert_eq!(report["missing_critical"], 2);
    }
}
