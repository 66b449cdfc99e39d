//! Error types for argsheet.
//!
//! Every fatal condition of the collect and consolidate jobs maps to one
//! variant of [`ArgSheetError`], carrying the path or value that caused it so
//! the command line can name the offending input.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in argsheet operations.
#[derive(Debug, Error)]
pub enum ArgSheetError {
    /// The sample directory is missing or cannot be listed.
    #[error("failed to read sample directory '{path}': {source}")]
    SourceDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// The sample directory holds no `.tab` reports.
    #[error("no .tab sample files found in '{path}'")]
    NoSamples { path: PathBuf },

    /// Two sample files would become the same worksheet.
    #[error("sample files '{first}' and '{second}' both map to sheet name '{sheet}'")]
    DuplicateSheetName {
        sheet: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A file stem cannot be used as a worksheet name.
    #[error("sample file '{path}' gives invalid sheet name '{sheet}': {details}")]
    InvalidSheetName {
        sheet: String,
        details: String,
        path: PathBuf,
    },

    /// A gene column index is outside the worksheet.
    #[error(transparent)]
    InvalidColumn(#[from] ColumnIndexError),

    /// Failed to read or decode a sample file.
    #[error("failed to read sample file '{path}': {source}")]
    SampleRead {
        #[source]
        source: csv::Error,
        path: PathBuf,
    },

    /// A sample file has more rows or columns than a worksheet holds.
    #[error("sample file '{path}' does not fit in a worksheet: {details}")]
    SheetLimit { details: String, path: PathBuf },

    /// Failed to open the compiled workbook.
    #[error("failed to open workbook '{path}': {source}")]
    WorkbookOpen {
        #[source]
        source: calamine::XlsxError,
        path: PathBuf,
    },

    /// Failed to read one sheet of the compiled workbook.
    #[error("failed to read sheet '{sheet}' of workbook '{path}': {source}")]
    WorkbookSheet {
        #[source]
        source: calamine::XlsxError,
        sheet: String,
        path: PathBuf,
    },

    /// Failed to build or serialize an output workbook.
    #[error("failed to write workbook '{path}': {source}")]
    WorkbookWrite {
        #[source]
        source: rust_xlsxwriter::XlsxError,
        path: PathBuf,
    },

    /// Failed to write an output file.
    #[error("failed to write output '{path}': {source}")]
    OutputWrite {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Error for a column index beyond the last worksheet column.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("column index {column} is out of range: must be less than {limit}")]
pub struct ColumnIndexError {
    /// The invalid zero-based index that was provided.
    pub column: usize,
    /// Number of columns in a worksheet.
    pub limit: usize,
}
