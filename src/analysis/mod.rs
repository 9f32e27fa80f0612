//! Tabular summaries and model fitting over cleaned datasets.

pub mod aggregate;
pub mod pivot;
pub mod regression;

pub use aggregate::{Aggregation, aggregate_by_category};
pub use pivot::{Pivot, build_pivot, month_start};
pub use regression::{LinearFit, fit_linear};
