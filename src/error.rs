use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a pipeline run.
///
/// Everything recoverable (unparseable cells, optional columns that are
/// absent, an undefined R²) is expressed as `Option`/`Value::Missing` instead
/// and never reaches this type.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("input file not found: {}", path.display())]
    InputMissing { path: PathBuf },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("workbook {} contains no sheets", path.display())]
    NoSheets { path: PathBuf },

    #[error("sheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("columns '{first}' and '{second}' both normalize to '{name}'")]
    ColumnCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("predictor has {xs} values but response has {ys}")]
    LengthMismatch { xs: usize, ys: usize },

    #[error("linear regression needs at least 2 valid points, found {found}")]
    TooFewPoints { found: usize },
}
