//! Property-based tests using proptest.
//!
//! These tests check invariants of gene tallying over arbitrary sheets, and
//! that collected workbooks preserve every field of the source reports.

#![allow(clippy::unwrap_used)]

use argsheet::collect::collect;
use argsheet::consolidate::consolidate_sheets;
use argsheet::sample::{discover_samples, read_sample};
use argsheet::tally::{tally_sheet, GeneColumns, GeneRecord, NOT_AVAILABLE};
use argsheet::workbook::{Row, Sheet, WorkbookReader};
use proptest::prelude::*;
use std::collections::HashSet;

/// A cell drawn from a small vocabulary so that records repeat, including
/// blanks and the `N/A` placeholder.
fn cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(NOT_AVAILABLE.to_string())),
        Just(Some("blaTEM-1".to_string())),
        Just(Some("tet(A)".to_string())),
        Just(Some("sul1".to_string())),
        Just(Some("BETA-LACTAM".to_string())),
    ]
}

/// Rows of zero to four cells, so some rows are too short for the function
/// column.
fn rows() -> impl Strategy<Value = Vec<Row>> {
    proptest::collection::vec(proptest::collection::vec(cell(), 0..=4), 0..40)
}

/// A field with no tab or line break, empty about one time in five.
fn field() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        4 => "[A-Za-z0-9()'./+=\"-]{1,10}",
    ]
}

/// Drops what a worksheet cannot hold apart from blank cells: trailing empty
/// fields of each row, then trailing empty rows.
fn without_trailing_blanks(mut rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    for row in &mut rows {
        while row.last().is_some_and(String::is_empty) {
            row.pop();
        }
    }
    while rows.last().is_some_and(Vec::is_empty) {
        rows.pop();
    }
    rows
}

fn table() -> impl Strategy<Value = Vec<Vec<String>>> {
    proptest::collection::vec(proptest::collection::vec(field(), 1..6), 1..8)
}

fn columns() -> GeneColumns {
    GeneColumns::new(1, 3).unwrap()
}

proptest! {
    /// Every data row is counted exactly once; the header row never is.
    #[test]
    fn counts_cover_every_data_row(rows in rows()) {
        let counts = tally_sheet(&rows, columns());
        prop_assert_eq!(counts.total(), rows.len().saturating_sub(1) as u64);
    }

    /// Reportable occurrences add up to the data rows with a real gene name.
    #[test]
    fn reportable_sum_matches_named_rows(rows in rows()) {
        let counts = tally_sheet(&rows, columns());
        let expected = rows
            .iter()
            .skip(1)
            .filter(|row| GeneRecord::from_row(row, columns()).is_reportable())
            .count();
        let actual: u64 = counts.reportable().map(|(_, c)| u64::from(c)).sum();
        prop_assert_eq!(actual, expected as u64);
    }

    /// Records come out in the order they were first seen.
    #[test]
    fn enumeration_follows_first_sighting(rows in rows()) {
        let counts = tally_sheet(&rows, columns());

        let mut seen = HashSet::new();
        let expected: Vec<GeneRecord> = rows
            .iter()
            .skip(1)
            .map(|row| GeneRecord::from_row(row, columns()))
            .filter(|record| seen.insert(record.clone()))
            .collect();
        let actual: Vec<GeneRecord> = counts.iter().map(|(r, _)| r.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Consolidated rows never carry a blank or `N/A` gene name, never a zero
    /// count, and never repeat a (sheet, gene, function) triple.
    #[test]
    fn consolidated_rows_are_unique_and_reportable(a in rows(), b in rows()) {
        let sheets = [
            Sheet { name: "A".to_string(), rows: a },
            Sheet { name: "B".to_string(), rows: b },
        ];
        let consolidated = consolidate_sheets(&sheets, columns(), 1);

        let mut keys = HashSet::new();
        for row in &consolidated {
            prop_assert!(!row.gene_name.is_empty());
            prop_assert_ne!(row.gene_name.as_str(), NOT_AVAILABLE);
            prop_assert!(row.occurrences >= 1);
            prop_assert!(keys.insert((
                row.sheet_name.clone(),
                row.gene_name.clone(),
                row.gene_function.clone(),
            )));
        }
        // Sheet order is preserved
        let first_b = consolidated.iter().position(|r| r.sheet_name == "B");
        if let Some(first_b) = first_b {
            prop_assert!(consolidated[first_b..].iter().all(|r| r.sheet_name == "B"));
        }
    }

    /// Raising the minimum count only removes rows.
    #[test]
    fn min_count_filters_subset(rows in rows(), min_count in 1u32..4) {
        let sheets = [Sheet { name: "S".to_string(), rows }];
        let all = consolidate_sheets(&sheets, columns(), 1);
        let filtered = consolidate_sheets(&sheets, columns(), min_count);

        let expected: Vec<_> = all
            .into_iter()
            .filter(|r| r.occurrences >= min_count)
            .collect();
        prop_assert_eq!(filtered, expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Every filled field of every report reads back from the compiled
    /// workbook at the same position, as the same text; blank fields read
    /// back as blank.
    #[test]
    fn collect_preserves_every_field(first in table(), second in table()) {
        let dir = tempfile::tempdir().unwrap();
        let samples = dir.path().join("results");
        std::fs::create_dir(&samples).unwrap();
        for (name, table) in [("S1.tab", &first), ("S2.tab", &second)] {
            let content: String = table.iter().map(|r| r.join("\t") + "\n").collect();
            std::fs::write(samples.join(name), content).unwrap();
        }
        let compiled = dir.path().join("compiled.xlsx");

        collect(&samples, &compiled).unwrap();

        let mut reader = WorkbookReader::open(&compiled).unwrap();
        prop_assert_eq!(reader.sheet_names(), ["S1", "S2"]);
        for sample in discover_samples(&samples).unwrap() {
            let source = read_sample(&sample).unwrap();
            let sheet = reader.read_sheet(&sample.sheet_name).unwrap();
            let cells: Vec<Vec<String>> = sheet
                .rows
                .into_iter()
                .map(|r| r.into_iter().map(Option::unwrap_or_default).collect())
                .collect();
            prop_assert_eq!(cells, without_trailing_blanks(source.rows));
        }
    }
}
