use std::path::PathBuf;

use anyhow::Result;
use log::{info, warn};

use super::log_overview;
use crate::analysis::{LinearFit, fit_linear};
use crate::config::RegressionConfig;
use crate::data::coerce::{coerce_numeric, drop_missing};
use crate::data::loader::load_file;
use crate::data::normalize::{normalize_columns, rename_columns};
use crate::data::Dataset;
use crate::report::chart::{self, Labels};
use crate::report::{ensure_output_dir, write_text, write_workbook};

pub const REPORT_FILE: &str = "regresjon_parametre.txt";
pub const CLEANED_WORKBOOK: &str = "raadata.xlsx";

/// Cleaned data and the fitted line.
#[derive(Debug, Clone)]
pub struct Regression {
    /// Rows with both variables present, after renaming and coercion.
    pub data: Dataset,
    /// `(predictor, response)` pairs the line was fitted to.
    pub points: Vec<(f64, f64)>,
    pub fit: LinearFit,
}

/// Normalize, rename, coerce, drop incomplete rows and fit.
pub fn analyse(raw: Dataset, cfg: &RegressionConfig) -> Result<Regression> {
    let data = normalize_columns(raw)?;
    let data = rename_columns(data, &cfg.alias_pairs())?;

    let columns = [cfg.predictor.as_str(), cfg.response.as_str()];
    for col in columns {
        if !data.has_column(col) {
            warn!("column '{col}' not found (available: {:?})", data.columns);
        }
    }

    let data = coerce_numeric(data, &columns);
    let data = drop_missing(data, &columns);
    log_overview("cleaned data", &data);

    let points: Vec<(f64, f64)> =
        match (data.column_index(columns[0]), data.column_index(columns[1])) {
            (Some(x), Some(y)) => data
                .rows
                .iter()
                .filter_map(|row| Some((row[x].as_f64()?, row[y].as_f64()?)))
                .collect(),
            _ => Vec::new(),
        };

    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
    let fit = fit_linear(&xs, &ys)?;
    info!(
        "{} = {:.4} + {:.4} * {}  (R² = {:?}, n = {})",
        cfg.response, fit.intercept, fit.slope, cfg.predictor, fit.r_squared, fit.n
    );

    Ok(Regression { data, points, fit })
}

/// File name of the chart, e.g. `regresjon_sko_vs_hoyde.pdf`.
pub fn chart_file(cfg: &RegressionConfig) -> String {
    format!("regresjon_{}_vs_{}.pdf", cfg.predictor, cfg.response)
}

/// Write the chart, the parameter report and the cleaned data. Returns the
/// paths written, in order.
pub fn persist(result: &Regression, cfg: &RegressionConfig) -> Result<Vec<PathBuf>> {
    let out = &cfg.output_dir;
    ensure_output_dir(out)?;

    let chart_path = out.join(chart_file(cfg));
    let title = format!("Lineær regresjon: {} mot {}", cfg.response, cfg.predictor);
    chart::scatter_with_fit(
        &chart_path,
        &Labels {
            title: &title,
            x: &cfg.predictor,
            y: &cfg.response,
        },
        &result.points,
        &result.fit,
    )?;
    info!("wrote {}", chart_path.display());

    let report_path = out.join(REPORT_FILE);
    write_text(&report_path, &result.fit.report(&cfg.predictor, &cfg.response))?;

    let workbook = out.join(CLEANED_WORKBOOK);
    write_workbook(&workbook, &[("raadata", &result.data)])?;

    Ok(vec![chart_path, report_path, workbook])
}

/// Load the configured workbook and run the whole pipeline.
pub fn run(cfg: &RegressionConfig) -> Result<Vec<PathBuf>> {
    let raw = load_file(&cfg.input, cfg.sheet.as_deref())?;
    let result = analyse(raw, cfg)?;
    persist(&result, cfg)
}
