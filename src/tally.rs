//! Per-sheet gene occurrence counting.
//!
//! Every worksheet row after the first contributes one [`GeneRecord`], the
//! pair of values found in the gene-name and gene-function columns. Records
//! are counted in an insertion-ordered map, so enumeration follows the order
//! in which each pair was first seen and repeated runs give identical output.
//!
//! # Example
//!
//! ```rust
//! use argsheet::tally::{tally_sheet, GeneColumns, GeneRecord};
//!
//! let row = |name: &str, function: &str| vec![Some(name.to_string()), Some(function.to_string())];
//! let rows = vec![
//!     row("Gene", "Function"),
//!     row("tetA", "efflux"),
//!     row("tetA", "efflux"),
//!     row("N/A", "unknown"),
//! ];
//! let columns = GeneColumns::new(0, 1)?;
//! let counts = tally_sheet(&rows, columns);
//!
//! assert_eq!(counts.get(&GeneRecord::new(Some("tetA"), Some("efflux"))), Some(2));
//! assert_eq!(counts.reportable().count(), 1);
//! # Ok::<(), argsheet::error::ColumnIndexError>(())
//! ```

use indexmap::IndexMap;

use crate::{column::ColumnIndex, error::ColumnIndexError, workbook::Row};

/// Placeholder written by detection tools when no gene was assigned.
pub const NOT_AVAILABLE: &str = "N/A";

/// Number of leading rows skipped in every sheet, regardless of content.
pub const HEADER_ROWS: usize = 1;

/// The columns a gene record is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneColumns {
    /// Column holding the gene name.
    pub name: ColumnIndex,
    /// Column holding the gene function.
    pub function: ColumnIndex,
}

impl Default for GeneColumns {
    fn default() -> Self {
        Self {
            name: ColumnIndex::DEFAULT_NAME,
            function: ColumnIndex::DEFAULT_FUNCTION,
        }
    }
}

impl GeneColumns {
    /// Validates both zero-based column indices.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnIndexError`] for the first index outside a worksheet.
    pub const fn new(name: usize, function: usize) -> Result<Self, ColumnIndexError> {
        let name = match ColumnIndex::new(name) {
            Ok(name) => name,
            Err(e) => return Err(e),
        };
        let function = match ColumnIndex::new(function) {
            Ok(function) => function,
            Err(e) => return Err(e),
        };
        Ok(Self { name, function })
    }
}

/// A (gene name, gene function) pair taken from one data row.
///
/// Blank values are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GeneRecord {
    pub name: Option<String>,
    pub function: Option<String>,
}

impl GeneRecord {
    /// Builds a record, treating empty strings as absent.
    #[must_use]
    pub fn new(name: Option<&str>, function: Option<&str>) -> Self {
        let present = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_owned);
        Self {
            name: present(name),
            function: present(function),
        }
    }

    /// Reads the record out of `row`. Cells past the end of a short row are
    /// absent.
    #[must_use]
    pub fn from_row(row: &[Option<String>], columns: GeneColumns) -> Self {
        let cell = |column: ColumnIndex| row.get(column.get()).and_then(Option::as_deref);
        Self::new(cell(columns.name), cell(columns.function))
    }

    /// Whether this record belongs in the consolidated table: the gene name
    /// must be present and not the `N/A` placeholder. The function is never
    /// checked.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| !name.is_empty() && name != NOT_AVAILABLE)
    }
}

/// Occurrence counts of gene records within one sheet, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceCounts(IndexMap<GeneRecord, u32>);

impl OccurrenceCounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more row carrying `record`.
    pub fn record(&mut self, record: GeneRecord) {
        *self.0.entry(record).or_insert(0) += 1;
    }

    /// Count for `record`, if it was seen.
    #[must_use]
    pub fn get(&self, record: &GeneRecord) -> Option<u32> {
        self.0.get(record).copied()
    }

    /// Number of distinct records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All records with their counts, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&GeneRecord, u32)> {
        self.0.iter().map(|(record, count)| (record, *count))
    }

    /// Reportable records with their counts, in first-seen order.
    pub fn reportable(&self) -> impl Iterator<Item = (&GeneRecord, u32)> {
        self.iter().filter(|(record, _)| record.is_reportable())
    }

    /// Number of rows counted, over every record.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().map(|&count| u64::from(count)).sum()
    }
}

impl FromIterator<GeneRecord> for OccurrenceCounts {
    fn from_iter<I: IntoIterator<Item = GeneRecord>>(iter: I) -> Self {
        let mut counts = Self::new();
        for record in iter {
            counts.record(record);
        }
        counts
    }
}

/// Counts gene records over the data rows of a sheet.
///
/// The first [`HEADER_ROWS`] rows are skipped by position, whatever they
/// contain. Every other row counts once, including rows whose gene name is
/// absent or `N/A`; use [`OccurrenceCounts::reportable`] to filter them.
#[must_use]
pub fn tally_sheet(rows: &[Row], columns: GeneColumns) -> OccurrenceCounts {
    rows.iter()
        .skip(HEADER_ROWS)
        .map(|row| GeneRecord::from_row(row, columns))
        .collect()
}
