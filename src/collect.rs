//! Compiling sample reports into one workbook.
//!
//! Each `.tab` report in the sample directory becomes one worksheet named
//! after the file stem. Field `c` of line `r` is written to cell `(r, c)` as
//! text, with no type coercion; empty fields are left blank.
//!
//! A blank cell is indistinguishable from a missing one, so trailing empty
//! fields of a line and trailing blank lines of a report are not kept: a
//! worksheet read back ends at its last filled cell in each row, and at its
//! last row holding one. Blank lines between filled rows keep their position.
//!
//! # Example
//!
//! ```rust,no_run
//! use argsheet::collect::collect;
//!
//! let summary = collect("results/", "compiled_data.xlsx")?;
//! println!("Wrote {} sheets", summary.sheets);
//! # Ok::<(), argsheet::error::ArgSheetError>(())
//! ```

use std::path::Path;

use rust_xlsxwriter::{ColNum, RowNum, Workbook, XlsxError};

use crate::{
    error::ArgSheetError,
    output::replace_file,
    sample::{read_samples, SampleTable},
    workbook::new_workbook,
};

#[cfg(feature = "tracing")]
use tracing::{info, info_span};

/// What a collect run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// Worksheets written, one per sample report.
    pub sheets: usize,
    /// Rows written over all worksheets.
    pub rows: usize,
}

/// Builds an in-memory workbook with one text-only worksheet per table, in
/// the order given.
///
/// # Errors
///
/// Returns the workbook library's error for an unusable sheet name or a
/// cell outside worksheet limits.
pub fn build_workbook(tables: &[SampleTable]) -> Result<Workbook, XlsxError> {
    let mut workbook = new_workbook()?;

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name)?;

        for (r, fields) in table.rows.iter().enumerate() {
            let row = RowNum::try_from(r).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (c, field) in fields.iter().enumerate() {
                if field.is_empty() {
                    continue;
                }
                let col = ColNum::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
                worksheet.write_string(row, col, field)?;
            }
        }
    }

    Ok(workbook)
}

/// Compiles every `.tab` report in `dir` into the workbook at `output`.
///
/// All reports are read before anything is written, and the workbook
/// replaces `output` only once complete, so a failed run leaves no partial
/// workbook behind.
///
/// # Errors
///
/// - [`ArgSheetError::SourceDir`], [`ArgSheetError::NoSamples`],
///   [`ArgSheetError::InvalidSheetName`] or [`ArgSheetError::DuplicateSheetName`]
///   if the sample directory is unusable
/// - [`ArgSheetError::SampleRead`] or [`ArgSheetError::SheetLimit`] naming the
///   report that could not be transcribed
/// - [`ArgSheetError::WorkbookWrite`] or [`ArgSheetError::OutputWrite`] if the
///   workbook cannot be produced
pub fn collect<P, Q>(dir: P, output: Q) -> Result<CollectSummary, ArgSheetError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (dir, output) = (dir.as_ref(), output.as_ref());

    #[cfg(feature = "tracing")]
    let _span = info_span!("collect", dir = ?dir, output = ?output).entered();

    let tables = read_samples(dir)?;
    if tables.is_empty() {
        return Err(ArgSheetError::NoSamples {
            path: dir.to_path_buf(),
        });
    }

    let workbook_write = |source| ArgSheetError::WorkbookWrite {
        source,
        path: output.to_path_buf(),
    };
    let mut workbook = build_workbook(&tables).map_err(workbook_write)?;
    let bytes = workbook.save_to_buffer().map_err(workbook_write)?;
    replace_file(output, &bytes)?;

    let summary = CollectSummary {
        sheets: tables.len(),
        rows: tables.iter().map(|t| t.rows.len()).sum(),
    };

    #[cfg(feature = "tracing")]
    info!(
        sheets = summary.sheets,
        rows = summary.rows,
        cells = tables.iter().map(SampleTable::filled_cells).sum::<usize>(),
        "Compiled sample reports into workbook"
    );

    Ok(summary)
}
