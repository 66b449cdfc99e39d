//! Consolidating a compiled workbook into one table of gene occurrence
//! counts.
//!
//! For each worksheet, in workbook order, gene records are counted with
//! [`tally_sheet`] and one [`ConsolidatedRow`] is emitted per reportable
//! record, in first-seen order.
//!
//! # Example
//!
//! ```rust,no_run
//! use argsheet::cli::OutputFormat;
//! use argsheet::consolidate::Consolidator;
//!
//! let summary = Consolidator::new()
//!     .name_column(5)?
//!     .function_column(14)?
//!     .format(OutputFormat::Xlsx)
//!     .run("compiled_data.xlsx", "consolidated_data.xlsx")?;
//! println!("{} rows from {} sheets", summary.rows, summary.sheets);
//! # Ok::<(), argsheet::error::ArgSheetError>(())
//! ```

use std::{io::Write, num::NonZeroU32, path::Path};

use rust_xlsxwriter::{RowNum, Workbook, XlsxError};
use serde::Serialize;

use crate::{
    cli::OutputFormat,
    column::ColumnIndex,
    error::{ArgSheetError, ColumnIndexError},
    output::replace_file,
    tally::{tally_sheet, GeneColumns, OccurrenceCounts},
    workbook::{new_workbook, Sheet, WorkbookReader},
};

#[cfg(feature = "tracing")]
use tracing::{debug, info, info_span};

/// How [`Consolidator::run_to_writer`] names its output in errors.
pub const WRITER_DESTINATION: &str = "<output stream>";

/// Column headings of the consolidated table.
pub const HEADER: [&str; 4] = ["Sheet_Name", "Gene_Name", "Gene_Function", "Occurrences"];

/// One line of the consolidated table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidatedRow {
    pub sheet_name: String,
    pub gene_name: String,
    pub gene_function: Option<String>,
    pub occurrences: u32,
}

/// What a consolidate run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidateSummary {
    /// Worksheets scanned.
    pub sheets: usize,
    /// Data rows written, excluding the header.
    pub rows: usize,
}

/// Emits the consolidated rows for one sheet's counts: reportable records
/// only, with at least `min_count` occurrences, in first-seen order.
pub fn consolidated_rows(
    sheet_name: &str,
    counts: &OccurrenceCounts,
    min_count: u32,
) -> Vec<ConsolidatedRow> {
    counts
        .reportable()
        .filter(|(_, count)| *count >= min_count)
        .filter_map(|(record, occurrences)| {
            Some(ConsolidatedRow {
                sheet_name: sheet_name.to_string(),
                gene_name: record.name.clone()?,
                gene_function: record.function.clone(),
                occurrences,
            })
        })
        .collect()
}

/// Consolidates already-loaded sheets, in the order given.
pub fn consolidate_sheets(
    sheets: &[Sheet],
    columns: GeneColumns,
    min_count: u32,
) -> Vec<ConsolidatedRow> {
    sheets
        .iter()
        .flat_map(|sheet| {
            let counts = tally_sheet(&sheet.rows, columns);
            consolidated_rows(&sheet.name, &counts, min_count)
        })
        .collect()
}

/// Builds the single-sheet output workbook: header on row 0, data rows
/// contiguous from row 1, occurrences as number cells.
///
/// # Errors
///
/// Returns the workbook library's error if a cell cannot be written.
pub fn build_workbook(rows: &[ConsolidatedRow]) -> Result<Workbook, XlsxError> {
    let mut workbook = new_workbook()?;
    let worksheet = workbook.add_worksheet();

    for (col, heading) in (0..).zip(HEADER) {
        worksheet.write_string(0, col, heading)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = RowNum::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        worksheet.write_string(r, 0, &row.sheet_name)?;
        worksheet.write_string(r, 1, &row.gene_name)?;
        if let Some(function) = row.gene_function.as_deref().filter(|f| !f.is_empty()) {
            worksheet.write_string(r, 2, function)?;
        }
        worksheet.write_number(r, 3, row.occurrences)?;
    }

    Ok(workbook)
}

/// Writes the consolidated table as tab-separated values with a header line.
/// Absent functions are written as empty fields. A field holding a tab,
/// quote or line break is quoted, so every row stays on one line.
///
/// # Errors
///
/// Returns an I/O error if `writer` fails.
pub fn write_tsv<W: Write>(rows: &[ConsolidatedRow], writer: W) -> std::io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(HEADER)?;
    for row in rows {
        let occurrences = row.occurrences.to_string();
        writer.write_record([
            row.sheet_name.as_str(),
            row.gene_name.as_str(),
            row.gene_function.as_deref().unwrap_or_default(),
            occurrences.as_str(),
        ])?;
    }
    writer.flush()
}

/// Writes the consolidated table as a pretty-printed JSON array. Absent
/// functions are written as `null`.
///
/// # Errors
///
/// Returns an I/O error if serialization or `writer` fails.
pub fn write_json<W: Write>(rows: &[ConsolidatedRow], mut writer: W) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)?;
    writer.flush()
}

/// Serializes `rows` in `format`.
///
/// # Errors
///
/// Returns [`ArgSheetError::WorkbookWrite`] or [`ArgSheetError::OutputWrite`]
/// if serialization fails; `destination` only names the output in the error.
pub fn render(
    rows: &[ConsolidatedRow],
    format: OutputFormat,
    destination: &Path,
) -> Result<Vec<u8>, ArgSheetError> {
    let output_write = |source: std::io::Error| ArgSheetError::OutputWrite {
        source,
        path: destination.to_path_buf(),
    };

    match format {
        OutputFormat::Xlsx => build_workbook(rows)
            .and_then(|mut workbook| workbook.save_to_buffer())
            .map_err(|source| ArgSheetError::WorkbookWrite {
                source,
                path: destination.to_path_buf(),
            }),
        OutputFormat::Tsv => {
            let mut buf = Vec::new();
            write_tsv(rows, &mut buf).map_err(output_write)?;
            Ok(buf)
        }
        OutputFormat::Json => {
            let mut buf = Vec::new();
            write_json(rows, &mut buf).map_err(output_write)?;
            Ok(buf)
        }
    }
}

/// A builder for configuring consolidate runs.
///
/// # Example
///
/// ```rust
/// use argsheet::consolidate::Consolidator;
/// use std::num::NonZeroU32;
///
/// let consolidator = Consolidator::new()
///     .name_column(2)?
///     .function_column(9)?
///     .min_count(NonZeroU32::new(2).unwrap());
/// assert_eq!(consolidator.columns().name.get(), 2);
/// # Ok::<(), argsheet::error::ColumnIndexError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consolidator {
    columns: GeneColumns,
    min_count: NonZeroU32,
    format: OutputFormat,
}

impl Default for Consolidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Consolidator {
    /// Creates a builder with default settings.
    ///
    /// Default settings:
    /// - gene name in column 5 (`F`), gene function in column 14 (`O`)
    /// - `min_count`: 1 (include every reportable record)
    /// - `format`: xlsx
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: GeneColumns::default(),
            min_count: NonZeroU32::MIN,
            format: OutputFormat::Xlsx,
        }
    }

    /// Sets the zero-based gene-name column.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnIndexError`] if the column is outside a worksheet.
    pub fn name_column(mut self, column: usize) -> Result<Self, ColumnIndexError> {
        self.columns.name = ColumnIndex::new(column)?;
        Ok(self)
    }

    /// Sets the zero-based gene-function column.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnIndexError`] if the column is outside a worksheet.
    pub fn function_column(mut self, column: usize) -> Result<Self, ColumnIndexError> {
        self.columns.function = ColumnIndex::new(column)?;
        Ok(self)
    }

    /// Sets both columns from pre-validated indices.
    #[must_use]
    pub const fn columns_validated(mut self, columns: GeneColumns) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the minimum occurrence count. Records seen fewer times are not
    /// emitted.
    #[must_use]
    pub const fn min_count(mut self, min_count: NonZeroU32) -> Self {
        self.min_count = min_count;
        self
    }

    /// Sets the output format for [`run()`](Self::run).
    #[must_use]
    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub const fn columns(&self) -> GeneColumns {
        self.columns
    }

    /// Reads the workbook at `path` and returns its consolidated rows.
    ///
    /// # Errors
    ///
    /// Returns [`ArgSheetError::WorkbookOpen`] or
    /// [`ArgSheetError::WorkbookSheet`] if the workbook cannot be read.
    pub fn rows<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ConsolidatedRow>, ArgSheetError> {
        Ok(self.scan(path.as_ref())?.0)
    }

    /// Consolidates the workbook at `workbook` and writes the table to
    /// `output`, replacing it only once the table is complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the workbook cannot be read or the output cannot
    /// be written. No output is produced in either case.
    pub fn run<P, Q>(&self, workbook: P, output: Q) -> Result<ConsolidateSummary, ArgSheetError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (workbook, output) = (workbook.as_ref(), output.as_ref());

        #[cfg(feature = "tracing")]
        let _span = info_span!(
            "consolidate",
            workbook = ?workbook,
            output = ?output,
            name_column = self.columns.name.get(),
            function_column = self.columns.function.get(),
        )
        .entered();

        let (rows, sheets) = self.scan(workbook)?;
        let bytes = render(&rows, self.format, output)?;
        replace_file(output, &bytes)?;

        let summary = ConsolidateSummary {
            sheets,
            rows: rows.len(),
        };

        #[cfg(feature = "tracing")]
        info!(
            sheets = summary.sheets,
            rows = summary.rows,
            format = %self.format,
            "Wrote consolidated table"
        );

        Ok(summary)
    }

    /// Consolidates the workbook at `workbook` and writes the table to
    /// `writer` in the configured format. Nothing is written unless the
    /// whole table could be built.
    ///
    /// # Errors
    ///
    /// Returns an error if the workbook cannot be read or `writer` fails;
    /// write errors name the destination as [`WRITER_DESTINATION`].
    pub fn run_to_writer<P, W>(
        &self,
        workbook: P,
        mut writer: W,
    ) -> Result<ConsolidateSummary, ArgSheetError>
    where
        P: AsRef<Path>,
        W: Write,
    {
        let destination = Path::new(WRITER_DESTINATION);
        let (rows, sheets) = self.scan(workbook.as_ref())?;
        let bytes = render(&rows, self.format, destination)?;
        writer
            .write_all(&bytes)
            .and_then(|()| writer.flush())
            .map_err(|source| ArgSheetError::OutputWrite {
                source,
                path: destination.to_path_buf(),
            })?;

        Ok(ConsolidateSummary {
            sheets,
            rows: rows.len(),
        })
    }

    fn scan(&self, path: &Path) -> Result<(Vec<ConsolidatedRow>, usize), ArgSheetError> {
        let sheets = WorkbookReader::open(path)?.read_all()?;
        let mut rows = Vec::new();

        for sheet in &sheets {
            let counts = tally_sheet(&sheet.rows, self.columns);
            let emitted = consolidated_rows(&sheet.name, &counts, self.min_count.get());

            #[cfg(feature = "tracing")]
            debug!(
                sheet = %sheet.name,
                distinct = counts.len(),
                emitted = emitted.len(),
                "Tallied worksheet"
            );

            rows.extend(emitted);
        }

        Ok((rows, sheets.len()))
    }
}

/// Consolidates `workbook` into `output` with the given columns and default
/// settings otherwise (xlsx output, no minimum count).
///
/// # Errors
///
/// See [`Consolidator::run`].
pub fn consolidate<P, Q>(
    workbook: P,
    output: Q,
    columns: GeneColumns,
) -> Result<ConsolidateSummary, ArgSheetError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    Consolidator::new()
        .columns_validated(columns)
        .run(workbook, output)
}
