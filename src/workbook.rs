//! Reading compiled workbooks, and creating new ones.
//!
//! Worksheets are read into [`Sheet`]s whose rows are addressed by absolute
//! worksheet position, so row `0` is always the first worksheet row even when
//! it is blank.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook, XlsxError};

use crate::error::ArgSheetError;

#[cfg(feature = "tracing")]
use tracing::debug;

/// One worksheet row. Blank cells are `None`.
pub type Row = Vec<Option<String>>;

/// A worksheet read into memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    /// Worksheet name.
    pub name: String,
    /// Rows from the first worksheet row to the last used one, each trimmed
    /// of trailing blank cells.
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Returns the text of cell `(row, column)`, or `None` if it is blank or
    /// outside the used range.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }
}

/// An open workbook whose sheets are read on demand, in workbook order.
pub struct WorkbookReader {
    path: PathBuf,
    inner: Xlsx<BufReader<File>>,
}

impl std::fmt::Debug for WorkbookReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkbookReader")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl WorkbookReader {
    /// Opens the workbook at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgSheetError::WorkbookOpen`] if the file is missing or is
    /// not a readable workbook.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArgSheetError> {
        let path = path.as_ref().to_path_buf();
        let inner = open_workbook::<Xlsx<_>, _>(&path).map_err(|source| {
            ArgSheetError::WorkbookOpen {
                source,
                path: path.clone(),
            }
        })?;
        Ok(Self { path, inner })
    }

    /// Worksheet names in workbook order.
    #[must_use]
    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    /// Reads the named worksheet.
    ///
    /// # Errors
    ///
    /// Returns [`ArgSheetError::WorkbookSheet`] if the sheet cannot be read.
    pub fn read_sheet(&mut self, name: &str) -> Result<Sheet, ArgSheetError> {
        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|source| ArgSheetError::WorkbookSheet {
                source,
                sheet: name.to_string(),
                path: self.path.clone(),
            })?;
        let rows = range_rows(&range);

        #[cfg(feature = "tracing")]
        debug!(sheet = name, rows = rows.len(), "Read worksheet");

        Ok(Sheet {
            name: name.to_string(),
            rows,
        })
    }

    /// Reads every worksheet, in workbook order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ArgSheetError::WorkbookSheet`] encountered.
    pub fn read_all(&mut self) -> Result<Vec<Sheet>, ArgSheetError> {
        self.sheet_names()
            .iter()
            .map(|name| self.read_sheet(name))
            .collect()
    }
}

/// Creates an empty workbook with a fixed creation date, so identical
/// content always serializes to identical bytes.
pub(crate) fn new_workbook() -> Result<Workbook, XlsxError> {
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    let mut workbook = Workbook::new();
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
    Ok(workbook)
}

/// Returns the display text of a cell, or `None` for a blank one.
///
/// Text is returned as stored; numbers, booleans, dates and error values are
/// rendered the way the workbook library displays them (`3.0` becomes `"3"`).
#[must_use]
pub fn cell_text(data: &Data) -> Option<String> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn range_rows(range: &Range<Data>) -> Vec<Row> {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };
    (0..=end_row)
        .map(|r| {
            let mut row: Row = (0..=end_col)
                .map(|c| range.get_value((r, c)).and_then(cell_text))
                .collect();
            while row.last().is_some_and(Option::is_none) {
                row.pop();
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_of_each_kind() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(
            cell_text(&Data::String("blaTEM-1".to_string())).as_deref(),
            Some("blaTEM-1")
        );
        assert_eq!(cell_text(&Data::Float(3.0)).as_deref(), Some("3"));
        assert_eq!(cell_text(&Data::Float(99.5)).as_deref(), Some("99.5"));
        assert_eq!(cell_text(&Data::Int(7)).as_deref(), Some("7"));
        assert_eq!(cell_text(&Data::Bool(true)).as_deref(), Some("true"));
    }

    #[test]
    fn sheet_cell_lookup() {
        let sheet = Sheet {
            name: "S1".to_string(),
            rows: vec![
                vec![Some("a".to_string()), None, Some("c".to_string())],
                vec![],
            ],
        };
        assert_eq!(sheet.cell(0, 0), Some("a"));
        assert_eq!(sheet.cell(0, 1), None);
        assert_eq!(sheet.cell(0, 2), Some("c"));
        assert_eq!(sheet.cell(0, 9), None);
        assert_eq!(sheet.cell(1, 0), None);
        assert_eq!(sheet.cell(5, 0), None);
    }

    #[test]
    fn open_missing_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkbookReader::open(dir.path().join("absent.xlsx")).unwrap_err();
        assert!(matches!(err, ArgSheetError::WorkbookOpen { .. }));
    }

    #[test]
    fn open_corrupt_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();
        let err = WorkbookReader::open(&path).unwrap_err();
        assert!(matches!(err, ArgSheetError::WorkbookOpen { .. }));
    }
}
