use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use serde::de::DeserializeOwned;

// ---------------------------------------------------------------------------
// Tabulation (ledger) pipeline settings
// ---------------------------------------------------------------------------

/// Settings for the tabulation pipeline. Column names are given in their
/// normalized form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TabulationConfig {
    pub input: PathBuf,
    /// Sheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
    pub output_dir: PathBuf,
    /// Columns converted to dates when present.
    pub date_columns: Vec<String>,
    /// Columns converted to numbers when present.
    pub numeric_columns: Vec<String>,
    pub date_column: String,
    pub category_column: String,
    pub value_column: String,
    /// Derived month-bucket column added for the pivot.
    pub month_column: String,
    pub min_year: i32,
}

impl Default for TabulationConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data.xlsx"),
            sheet: None,
            output_dir: PathBuf::from("utdata"),
            date_columns: vec!["dato".into()],
            numeric_columns: vec!["beløp".into(), "amount".into(), "sum".into()],
            date_column: "dato".into(),
            category_column: "kategori".into(),
            value_column: "beløp".into(),
            month_column: "måned".into(),
            min_year: 2024,
        }
    }
}

// ---------------------------------------------------------------------------
// Regression (measurement) pipeline settings
// ---------------------------------------------------------------------------

/// A column rename applied after normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnAlias {
    pub from: String,
    pub to: String,
}

/// Settings for the regression pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    pub input: PathBuf,
    pub sheet: Option<String>,
    pub output_dir: PathBuf,
    /// Renames to ASCII-safe aliases, applied after normalization.
    pub aliases: Vec<ColumnAlias>,
    pub predictor: String,
    pub response: String,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("maalinger.xlsx"),
            sheet: None,
            output_dir: PathBuf::from("utdata"),
            aliases: vec![
                ColumnAlias {
                    from: "skostørrelse".into(),
                    to: "sko".into(),
                },
                ColumnAlias {
                    from: "høyde".into(),
                    to: "hoyde".into(),
                },
            ],
            predictor: "sko".into(),
            response: "hoyde".into(),
        }
    }
}

impl RegressionConfig {
    pub fn alias_pairs(&self) -> Vec<(&str, &str)> {
        self.aliases
            .iter()
            .map(|a| (a.from.as_str(), a.to.as_str()))
            .collect()
    }
}

/// Read a JSON settings file if it exists, otherwise use the defaults.
/// Fields left out of the file keep their default values.
pub fn load_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing settings {}", path.display()))?;
    info!("using settings from {}", path.display());
    Ok(config)
}
