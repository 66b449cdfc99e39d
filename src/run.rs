//! Command dispatch.
//!
//! Maps parsed command-line arguments onto the collect and consolidate jobs.
//! Every path is passed explicitly; nothing depends on the process working
//! directory beyond ordinary relative-path resolution.

use std::path::Path;

use crate::{
    cli::{Args, Command, ConsolidateOptions, STDOUT_PATH},
    collect::{collect, CollectSummary},
    consolidate::{ConsolidateSummary, Consolidator},
    error::ArgSheetError,
    tally::GeneColumns,
};

#[cfg(feature = "tracing")]
use tracing::info;

/// What a command produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Set when the command compiled a workbook.
    pub collected: Option<CollectSummary>,
    /// Set when the command wrote a consolidated table.
    pub consolidated: Option<ConsolidateSummary>,
}

impl From<ConsolidateOptions> for Consolidator {
    fn from(options: ConsolidateOptions) -> Self {
        Self::new()
            .columns_validated(GeneColumns {
                name: options.name_column,
                function: options.function_column,
            })
            .min_count(options.min_count)
            .format(options.format)
    }
}

/// Runs the command described by `args`.
///
/// # Errors
///
/// Returns the first fatal error of the job; no output is left at the
/// failing job's destination.
pub fn run(args: &Args) -> Result<RunSummary, ArgSheetError> {
    match &args.command {
        Command::Collect { dir, output } => Ok(RunSummary {
            collected: Some(collect(dir, output)?),
            consolidated: None,
        }),
        Command::Consolidate {
            workbook,
            output,
            options,
        } => Ok(RunSummary {
            collected: None,
            consolidated: Some(consolidate_to(
                &Consolidator::from(*options),
                workbook,
                output,
            )?),
        }),
        Command::Pipeline {
            dir,
            compiled,
            output,
            options,
        } => {
            let (collected, consolidated) =
                pipeline(dir, compiled, output, &Consolidator::from(*options))?;
            Ok(RunSummary {
                collected: Some(collected),
                consolidated: Some(consolidated),
            })
        }
    }
}

/// Compiles `dir` into `compiled`, then consolidates `compiled` into
/// `output`. The second job only starts once the first has succeeded.
///
/// # Errors
///
/// Returns the first fatal error of either job.
pub fn pipeline<P, Q, R>(
    dir: P,
    compiled: Q,
    output: R,
    consolidator: &Consolidator,
) -> Result<(CollectSummary, ConsolidateSummary), ArgSheetError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let collected = collect(dir, &compiled)?;

    #[cfg(feature = "tracing")]
    info!(compiled = ?compiled.as_ref(), "Compiled workbook ready, consolidating");

    let consolidated = consolidate_to(consolidator, compiled.as_ref(), output.as_ref())?;
    Ok((collected, consolidated))
}

/// Runs `consolidator` into `output`, or into standard output when `output`
/// is `-`.
fn consolidate_to(
    consolidator: &Consolidator,
    workbook: &Path,
    output: &Path,
) -> Result<ConsolidateSummary, ArgSheetError> {
    if output.as_os_str() == STDOUT_PATH {
        consolidator.run_to_writer(workbook, std::io::stdout().lock())
    } else {
        consolidator.run(workbook, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use clap::Parser;
    use std::num::NonZeroU32;

    #[test]
    fn consolidator_from_options() {
        let args = Args::try_parse_from([
            "argsheet",
            "consolidate",
            "compiled.xlsx",
            "-n",
            "1",
            "-f",
            "3",
            "--min-count",
            "2",
            "--format",
            "json",
        ])
        .unwrap();
        let Command::Consolidate { options, .. } = args.command else {
            panic!("expected consolidate");
        };

        let expected = Consolidator::new()
            .name_column(1)
            .and_then(|c| c.function_column(3))
            .unwrap()
            .min_count(NonZeroU32::new(2).unwrap())
            .format(OutputFormat::Json);
        assert_eq!(Consolidator::from(options), expected);
    }

    #[test]
    fn pipeline_runs_both_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let samples = dir.path().join("results");
        std::fs::create_dir(&samples).unwrap();
        std::fs::write(samples.join("S1.tab"), "GENE\tFUNCTION\ntetA\tefflux\n").unwrap();
        let compiled = dir.path().join("compiled.xlsx");
        let output = dir.path().join("consolidated.tsv");

        let consolidator = Consolidator::new()
            .name_column(0)
            .and_then(|c| c.function_column(1))
            .unwrap()
            .format(OutputFormat::Tsv);
        let (collected, consolidated) =
            pipeline(&samples, &compiled, &output, &consolidator).unwrap();

        assert_eq!(collected.sheets, 1);
        assert_eq!(consolidated.rows, 1);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Sheet_Name\tGene_Name\tGene_Function\tOccurrences\nS1\ttetA\tefflux\t1\n"
        );
    }

    #[test]
    fn pipeline_stops_after_failed_collect() {
        let dir = tempfile::tempdir().unwrap();
        let compiled = dir.path().join("compiled.xlsx");
        let output = dir.path().join("consolidated.xlsx");

        let result = pipeline(
            dir.path().join("absent"),
            &compiled,
            &output,
            &Consolidator::new(),
        );
        assert!(matches!(result, Err(ArgSheetError::SourceDir { .. })));
        assert!(!compiled.exists());
        assert!(!output.exists());
    }
}
