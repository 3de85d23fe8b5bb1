//! Command-line interface for ncompare

use crate::compare::CompareOptions;
use crate::sampling::{SampleConfig, DEFAULT_THRESHOLD, DEFAULT_TRIALS};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ncompare")]
#[command(about = "Compare the structure of two NetCDF files at the command line")]
#[command(version)]
pub struct Cli {
    /// First dataset
    pub nc_a: PathBuf,

    /// Second dataset
    pub nc_b: PathBuf,

    /// Name of a group containing the variable to inspect
    #[arg(short = 'g', long = "comparison-var-group")]
    pub comparison_var_group: Option<String>,

    /// Name of a variable whose values should be sampled and compared
    #[arg(short = 'v', long = "comparison-var-name")]
    pub comparison_var_name: Option<String>,

    /// Include chunk sizes in the variable comparison
    #[arg(long)]
    pub show_chunks: bool,

    /// Include variable attributes in the variable comparison
    #[arg(long)]
    pub show_attributes: bool,

    /// Only show rows whose values differ
    #[arg(long)]
    pub only_diffs: bool,

    /// Turn off ANSI colors
    #[arg(long)]
    pub no_color: bool,

    /// Also write the report as plain text to this .txt file
    #[arg(long)]
    pub file_text: Option<PathBuf>,

    /// Also write the comparison rows to this .csv file
    #[arg(long)]
    pub file_csv: Option<PathBuf>,

    /// Also write the comparison rows to this .xlsx workbook
    #[arg(long)]
    pub file_xlsx: Option<PathBuf>,

    /// Number of random positions checked for the selected variable
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    pub samples: usize,

    /// Largest difference between sampled values treated as a match
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_parser = validate_threshold)]
    pub threshold: f64,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings for the library entry point.
    pub fn to_options(&self) -> CompareOptions {
        CompareOptions {
            comparison_var_group: self.comparison_var_group.clone(),
            comparison_var_name: self.comparison_var_name.clone(),
            show_chunks: self.show_chunks,
            show_attributes: self.show_attributes,
            no_color: self.no_color,
            only_diffs: self.only_diffs,
            file_text: self.file_text.clone(),
            file_csv: self.file_csv.clone(),
            file_xlsx: self.file_xlsx.clone(),
            sampling: SampleConfig {
                trials: self.samples,
                threshold: self.threshold,
            },
        }
    }
}

/// Validate that the threshold is a finite, non-negative number
fn validate_threshold(s: &str) -> Result<f64, String> {
    let threshold: f64 = s
        .parse()
        .map_err(|_| format!("Invalid threshold: '{}'. Must be a number.", s))?;

    if !threshold.is_finite() || threshold < 0.0 {
        return Err("Threshold must be a finite, non-negative number".to_string());
    }

    Ok(threshold)
}
