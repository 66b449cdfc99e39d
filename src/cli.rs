//! Command-line interface definition.

use clap::{Parser, Subcommand, ValueEnum};
use std::{num::NonZeroU32, path::PathBuf};

use crate::column::ColumnIndex;

/// Output path that sends the consolidated table to standard output.
pub const STDOUT_PATH: &str = "-";

/// Collect per-sample antibiotic-resistance gene reports into a workbook and
/// consolidate gene occurrence counts.
#[derive(Parser, Debug)]
#[command(name = "argsheet")]
#[command(version, author, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile every .tab report in a directory into one workbook, one sheet per sample
    Collect {
        /// Directory holding the per-sample .tab reports
        dir: PathBuf,

        /// Workbook to create or overwrite
        #[arg(short, long, default_value = "compiled_data.xlsx")]
        output: PathBuf,
    },

    /// Count gene occurrences per sheet of a compiled workbook
    Consolidate {
        /// Workbook produced by `collect`
        workbook: PathBuf,

        /// File to create or overwrite, or `-` for standard output
        #[arg(short, long, default_value = "consolidated_data.xlsx")]
        output: PathBuf,

        #[command(flatten)]
        options: ConsolidateOptions,
    },

    /// Run `collect` then `consolidate`
    Pipeline {
        /// Directory holding the per-sample .tab reports
        dir: PathBuf,

        /// Intermediate workbook to create or overwrite
        #[arg(short, long, default_value = "compiled_data.xlsx")]
        compiled: PathBuf,

        /// File to create or overwrite, or `-` for standard output
        #[arg(short, long, default_value = "consolidated_data.xlsx")]
        output: PathBuf,

        #[command(flatten)]
        options: ConsolidateOptions,
    },
}

impl Args {
    /// Whether the consolidated table goes to standard output.
    #[must_use]
    pub fn writes_to_stdout(&self) -> bool {
        match &self.command {
            Command::Collect { .. } => false,
            Command::Consolidate { output, .. } | Command::Pipeline { output, .. } => {
                output.as_os_str() == STDOUT_PATH
            }
        }
    }
}

/// Options shared by `consolidate` and `pipeline`.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct ConsolidateOptions {
    /// Zero-based column holding the gene name
    #[arg(short, long, default_value_t = ColumnIndex::DEFAULT_NAME, value_parser = parse_column)]
    pub name_column: ColumnIndex,

    /// Zero-based column holding the gene function
    #[arg(short, long, default_value_t = ColumnIndex::DEFAULT_FUNCTION, value_parser = parse_column)]
    pub function_column: ColumnIndex,

    /// Minimum occurrence count (gene records below this are excluded)
    #[arg(short, long, default_value = "1", value_parser = parse_min_count)]
    pub min_count: NonZeroU32,

    /// Output format
    #[arg(long, value_enum, default_value = "xlsx")]
    pub format: OutputFormat,
}

/// Output format for the consolidated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Single-sheet workbook
    #[default]
    Xlsx,
    /// Tab-separated values with a header line
    Tsv,
    /// JSON array of row objects
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xlsx => write!(f, "xlsx"),
            Self::Tsv => write!(f, "tsv"),
            Self::Json => write!(f, "json"),
        }
    }
}

fn parse_column(s: &str) -> Result<ColumnIndex, String> {
    s.parse()
}

fn parse_min_count(s: &str) -> Result<NonZeroU32, String> {
    let min_count: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    NonZeroU32::new(min_count).ok_or_else(|| "minimum count must be at least 1".to_string())
}
