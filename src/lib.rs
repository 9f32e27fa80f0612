//! Spreadsheet analysis pipelines.
//!
//! Two independent single-shot pipelines share the data layer:
//!
//! * [`pipeline::tabulation`] – clean a ledger-style workbook, filter by year,
//!   sum per category, pivot per month and write CSV / XLSX / PDF results.
//! * [`pipeline::regression`] – clean a two-column measurement workbook, fit a
//!   least-squares line and write a chart, a parameter report and the cleaned
//!   data.

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;

pub use error::AnalysisError;
