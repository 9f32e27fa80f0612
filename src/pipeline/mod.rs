//! The two end-to-end pipelines.
//!
//! Each one is split into a pure `analyse` step (dataset in, result value
//! out) and a `persist` step that writes every output file; `run` chains
//! load → analyse → persist.

pub mod regression;
pub mod tabulation;

use log::{debug, info};

use crate::data::Dataset;

const PREVIEW_ROWS: usize = 10;

/// Log a short preview and per-column summary of a dataset.
fn log_overview(label: &str, dataset: &Dataset) {
    info!("{label}:\n{}", dataset.head(PREVIEW_ROWS));
    for col in dataset.summary() {
        debug!(
            "  {:<24} {:>6} non-missing  {}",
            col.name, col.non_missing, col.kind
        );
    }
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}
