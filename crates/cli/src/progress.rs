//! Progress reporting and summary output for the CLI

use std::path::Path;
use std::time::Duration;

use fastclean_core::{PipelineStats, Stage};
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner showing which pipeline stage is running
pub struct StageSpinner {
    bar: ProgressBar,
}

impl StageSpinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Spinner that draws nothing, for machine-readable output
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn set_stage(&self, stage: Stage) {
        self.bar.set_message(format!("{}...", stage.label()));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Print a formatted summary report
pub fn print_summary_report(
    input: &Path,
    clean: Option<&Path>,
    garbage: Option<&Path>,
    stats: &PipelineStats,
) {
    let t = &stats.transform;
    let total = t.input_records;

    println!("\n{}", "═".repeat(60));
    println!("Dataset Cleaning Complete");
    println!("{}", "═".repeat(60));
    println!("Input:              {}", input.display());

    match (clean, garbage) {
        (Some(clean), Some(garbage)) => {
            println!("Clean output:       {}", clean.display());
            println!("Garbage output:     {}", garbage.display());
        }
        _ => println!("Output:             (dry run - no output written)"),
    }

    println!("Total records:      {}", format_with_commas(total));

    if t.missing_critical() > 0 {
        println!(
            "Missing key fields: {} ({:.1}%; {} empty, {} incomplete)",
            format_with_commas(t.missing_critical()),
            stats.filter_rate(),
            format_with_commas(t.critically_empty),
            format_with_commas(t.incomplete)
        );
    }

    if t.duplicates > 0 {
        println!(
            "Duplicates removed: {} ({:.1}%)",
            format_with_commas(t.duplicates),
            stats.deduplication_rate()
        );
    }

    if t.emails_redacted > 0 {
        println!(
            "Emails redacted:    {} ({} placeholders)",
            format_with_commas(t.emails_redacted),
            format_with_commas(t.placeholder_emails)
        );
    }

    println!("Invalid rows kept:  {}", format_with_commas(t.invalid_records));
    println!(
        "Final dataset:      {} ({:.1}%)",
        format_with_commas(t.clean_records),
        stats.retention_rate()
    );

    println!("{}", "═".repeat(60));
}

/// Format number with thousand separators
pub fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
