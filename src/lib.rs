//! # argsheet
//!
//! Collects per-sample antibiotic-resistance gene reports (tab-delimited
//! `.tab` files) into one workbook, then consolidates that workbook into a
//! single table counting, per sample, how often each gene and function pair
//! was detected.
//!
//! ## Collect
//!
//! ```rust,no_run
//! use argsheet::collect::collect;
//!
//! // One worksheet per .tab file, named after the file stem
//! let summary = collect("results/", "compiled_data.xlsx")?;
//! # Ok::<(), argsheet::error::ArgSheetError>(())
//! ```
//!
//! ## Consolidate
//!
//! ```rust,no_run
//! use argsheet::consolidate::Consolidator;
//!
//! // Gene name in column F, gene function in column O
//! let summary = Consolidator::new()
//!     .name_column(5)?
//!     .function_column(14)?
//!     .run("compiled_data.xlsx", "consolidated_data.xlsx")?;
//! # Ok::<(), argsheet::error::ArgSheetError>(())
//! ```
//!
//! ## Features
//!
//! - `tracing`: structured logging of each job (enabled by default)

pub mod cli;
pub mod collect;
pub mod column;
pub mod consolidate;
pub mod error;
pub(crate) mod output;
pub mod run;
pub mod sample;
pub mod tally;
pub mod workbook;
