/// Data layer: core types, loading, cleaning and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .ods / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read first (or named) sheet → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  trim / underscore / strip / lowercase column names
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  coerce   │  per-cell parse to number or date, failures → Missing
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep rows from a threshold year onward
///   └──────────┘
/// ```

pub mod coerce;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;

pub use model::{ColumnSummary, Dataset, Value};
