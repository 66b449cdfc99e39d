//! Validated zero-based worksheet column indices.
//!
//! Gene report layouts differ between upstream detection tools, so the
//! columns holding the gene name and the gene function are configuration,
//! not constants. [`ColumnIndex`] guarantees the index addresses a real
//! worksheet column.
//!
//! # Example
//!
//! ```rust
//! use argsheet::column::ColumnIndex;
//!
//! let name = ColumnIndex::new(5)?;
//! assert_eq!(name.get(), 5);
//! # Ok::<(), argsheet::error::ColumnIndexError>(())
//! ```

use std::{fmt, str::FromStr};

use crate::error::ColumnIndexError;

/// Number of columns in a worksheet (`A` through `XFD`).
pub const MAX_COLUMNS: usize = 16_384;

/// Number of rows in a worksheet.
pub const MAX_ROWS: usize = 1_048_576;

/// Default gene-name column (`F`), matching common ARG report layouts.
pub const DEFAULT_NAME_COLUMN: usize = 5;

/// Default gene-function column (`O`), matching common ARG report layouts.
pub const DEFAULT_FUNCTION_COLUMN: usize = 14;

/// A zero-based column index known to be inside a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnIndex(u16);

impl ColumnIndex {
    /// The default gene-name column.
    #[allow(clippy::cast_possible_truncation)]
    pub const DEFAULT_NAME: Self = Self(DEFAULT_NAME_COLUMN as u16);

    /// The default gene-function column.
    #[allow(clippy::cast_possible_truncation)]
    pub const DEFAULT_FUNCTION: Self = Self(DEFAULT_FUNCTION_COLUMN as u16);

    /// Validates `column` against the worksheet width.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnIndexError`] if `column >= MAX_COLUMNS`.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(column: usize) -> Result<Self, ColumnIndexError> {
        if column < MAX_COLUMNS {
            Ok(Self(column as u16))
        } else {
            Err(ColumnIndexError {
                column,
                limit: MAX_COLUMNS,
            })
        }
    }

    /// Returns the zero-based index.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ColumnIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ColumnIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let column: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a valid zero-based column index"))?;
        Self::new(column).map_err(|e| e.to_string())
    }
}
