//! Discovery and parsing of per-sample `.tab` gene reports.
//!
//! A sample directory holds one tab-delimited report per biological sample.
//! Each report becomes one worksheet, named after the file with its `.tab`
//! extension removed.
//!
//! # Example
//!
//! ```rust
//! use argsheet::sample::sheet_name_for;
//! use std::path::Path;
//!
//! assert_eq!(sheet_name_for(Path::new("results/S1.tab")).as_deref(), Some("S1"));
//! assert_eq!(sheet_name_for(Path::new("results/S1.TAB")).as_deref(), Some("S1"));
//! assert_eq!(sheet_name_for(Path::new("results/notes.txt")), None);
//! ```

use std::{
    collections::HashMap,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    column::{MAX_COLUMNS, MAX_ROWS},
    error::ArgSheetError,
};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// File extension identifying a sample report, compared case-insensitively.
pub const SAMPLE_EXTENSION: &str = "tab";

/// Longest worksheet name a workbook accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// A sample report found in the sample directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    /// Worksheet name derived from the file stem.
    pub sheet_name: String,
    /// Location of the report.
    pub path: PathBuf,
}

/// The parsed contents of one sample report.
///
/// Rows keep their original order and width; ragged rows are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleTable {
    /// Worksheet name derived from the file stem.
    pub name: String,
    /// Tab-separated fields of each line.
    pub rows: Vec<Vec<String>>,
}

impl SampleTable {
    /// Number of cells holding a non-empty field.
    pub fn filled_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|field| !field.is_empty()).count())
            .sum()
    }
}

/// Returns the worksheet name for a sample report path, or `None` if the
/// path does not carry the `.tab` extension.
#[must_use]
pub fn sheet_name_for(path: &Path) -> Option<String> {
    let is_sample = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SAMPLE_EXTENSION));
    if !is_sample {
        return None;
    }
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

/// Checks a worksheet name against the rules spreadsheet applications enforce.
///
/// # Errors
///
/// Returns a description of the first rule the name breaks.
pub fn validate_sheet_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("sheet name is blank".to_string());
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(format!(
            "sheet name is longer than {MAX_SHEET_NAME_LEN} characters"
        ));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
        return Err(format!("sheet name contains forbidden character '{c}'"));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err("sheet name starts or ends with an apostrophe".to_string());
    }
    if name.eq_ignore_ascii_case("history") {
        return Err("'History' is reserved".to_string());
    }
    Ok(())
}

/// Lists the sample reports in `dir`, sorted by file name.
///
/// Entries without the `.tab` extension and anything that is not a regular
/// file are ignored.
///
/// # Errors
///
/// Returns [`ArgSheetError::SourceDir`] if `dir` cannot be listed,
/// [`ArgSheetError::InvalidSheetName`] if a file stem is not a usable
/// worksheet name, and [`ArgSheetError::DuplicateSheetName`] if two files map
/// to the same worksheet (worksheet names are case-insensitive).
pub fn discover_samples(dir: &Path) -> Result<Vec<SampleFile>, ArgSheetError> {
    let source_dir = |source| ArgSheetError::SourceDir {
        source,
        path: dir.to_path_buf(),
    };

    let mut samples = Vec::new();
    for entry in fs::read_dir(dir).map_err(source_dir)? {
        let path = entry.map_err(source_dir)?.path();
        let Some(sheet_name) = sheet_name_for(&path) else {
            continue;
        };
        if !path.is_file() {
            continue;
        }
        samples.push(SampleFile { sheet_name, path });
    }
    samples.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    let mut seen: HashMap<String, &SampleFile> = HashMap::with_capacity(samples.len());
    for sample in &samples {
        validate_sheet_name(&sample.sheet_name).map_err(|details| {
            ArgSheetError::InvalidSheetName {
                sheet: sample.sheet_name.clone(),
                details,
                path: sample.path.clone(),
            }
        })?;
        if let Some(first) = seen.insert(sample.sheet_name.to_lowercase(), sample) {
            return Err(ArgSheetError::DuplicateSheetName {
                sheet: sample.sheet_name.clone(),
                first: first.path.clone(),
                second: sample.path.clone(),
            });
        }
    }

    #[cfg(feature = "tracing")]
    info!(dir = ?dir, samples = samples.len(), "Discovered sample reports");

    Ok(samples)
}

/// Byte order mark some editors put at the start of UTF-8 text.
const BOM: char = '\u{feff}';

/// Builds the tab-delimited reader for report text whose line endings are
/// already `\n`.
fn tab_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(text.as_bytes())
}

/// Reads one sample report as tab-delimited UTF-8 text.
///
/// Fields are taken literally: no quoting, no trimming, no type coercion.
/// `\r\n`, `\n` and a lone `\r` all end a line. An empty line becomes an
/// empty row, so row `r` is always line `r` of the file. A leading byte order
/// mark is dropped.
///
/// # Errors
///
/// Returns [`ArgSheetError::SampleRead`] if the file cannot be opened or is
/// not valid UTF-8, and [`ArgSheetError::SheetLimit`] if it has more rows or
/// columns than a worksheet holds.
pub fn read_sample(sample: &SampleFile) -> Result<SampleTable, ArgSheetError> {
    let sample_read = |source: csv::Error| ArgSheetError::SampleRead {
        source,
        path: sample.path.clone(),
    };

    let raw = fs::read_to_string(&sample.path).map_err(|e| sample_read(e.into()))?;
    let text = raw
        .strip_prefix(BOM)
        .unwrap_or(raw.as_str())
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    // The reader skips empty lines; every other line is exactly one record
    let mut records = tab_reader(&text).into_records();
    let mut rows = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        if line_num >= MAX_ROWS {
            return Err(ArgSheetError::SheetLimit {
                details: format!("more than {MAX_ROWS} rows"),
                path: sample.path.clone(),
            });
        }
        let fields: Vec<String> = if line.is_empty() {
            Vec::new()
        } else {
            let record = records.next().transpose().map_err(sample_read)?;
            record
                .unwrap_or_default()
                .iter()
                .map(str::to_owned)
                .collect()
        };
        if fields.len() > MAX_COLUMNS {
            return Err(ArgSheetError::SheetLimit {
                details: format!(
                    "line {} has {} fields, more than {MAX_COLUMNS}",
                    line_num + 1,
                    fields.len()
                ),
                path: sample.path.clone(),
            });
        }
        rows.push(fields);
    }

    #[cfg(feature = "tracing")]
    debug!(path = ?sample.path, sheet = %sample.sheet_name, rows = rows.len(), "Read sample report");

    Ok(SampleTable {
        name: sample.sheet_name.clone(),
        rows,
    })
}

/// Discovers and reads every sample report in `dir`.
///
/// Either every report is read or an error names the first one that failed.
///
/// # Errors
///
/// See [`discover_samples`] and [`read_sample`].
pub fn read_samples(dir: &Path) -> Result<Vec<SampleTable>, ArgSheetError> {
    discover_samples(dir)?.iter().map(read_sample).collect()
}
