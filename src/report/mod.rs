//! Terminal output steps: charts, tables and text reports.

pub mod chart;
pub mod writer;

pub use writer::{ensure_output_dir, write_csv, write_text, write_workbook};
