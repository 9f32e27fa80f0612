use std::path::PathBuf;

use anyhow::Result;
use log::{info, warn};

use super::{as_strs, log_overview};
use crate::analysis::{Aggregation, Pivot, aggregate_by_category, build_pivot, month_start};
use crate::config::TabulationConfig;
use crate::data::coerce::{coerce_dates, coerce_numeric};
use crate::data::filter::filter_by_year;
use crate::data::loader::load_file;
use crate::data::normalize::normalize_columns;
use crate::data::{Dataset, Value};
use crate::report::chart::{self, Labels};
use crate::report::{ensure_output_dir, write_csv, write_workbook};

pub const SUMMARY_CSV: &str = "oppsummering_per_kategori.csv";
pub const RESULTS_WORKBOOK: &str = "resultater.xlsx";
pub const BAR_CHART: &str = "sum_per_kategori.pdf";

/// Everything the tabulation pipeline computes.
#[derive(Debug, Clone)]
pub struct Tabulation {
    /// Cleaned input; carries the month column when a pivot was built.
    pub data: Dataset,
    /// Rows from the threshold year onward (a copy of `data` without a date
    /// column).
    pub filtered: Dataset,
    pub aggregation: Option<Aggregation>,
    pub pivot: Option<Pivot>,
}

/// Normalize, coerce, filter, aggregate and pivot.
pub fn analyse(raw: Dataset, cfg: &TabulationConfig) -> Result<Tabulation> {
    let data = normalize_columns(raw)?;
    let data = coerce_dates(data, &as_strs(&cfg.date_columns));
    let mut data = coerce_numeric(data, &as_strs(&cfg.numeric_columns));
    log_overview("cleaned data", &data);

    let filtered = filter_by_year(&data, &cfg.date_column, cfg.min_year);
    info!(
        "{} of {} rows from {} onward",
        filtered.len(),
        data.len(),
        cfg.min_year
    );

    let aggregation = aggregate_by_category(&filtered, &cfg.category_column, &cfg.value_column);
    match &aggregation {
        Some(agg) => info!("{} categories in summary", agg.groups.len()),
        None => warn!(
            "no summary: need columns '{}' and '{}'",
            cfg.category_column, cfg.value_column
        ),
    }

    let pivot = build_pivot(
        &data,
        &cfg.category_column,
        &cfg.value_column,
        &cfg.date_column,
    );
    if pivot.is_some() {
        if let Some(idx) = data.column_index(&cfg.date_column) {
            data.add_column(&cfg.month_column, |row| {
                row[idx]
                    .as_date()
                    .map(|d| Value::Date(month_start(d)))
                    .unwrap_or(Value::Missing)
            });
        }
    } else {
        info!("no pivot: category, value or date column missing");
    }

    Ok(Tabulation {
        data,
        filtered,
        aggregation,
        pivot,
    })
}

/// Write CSVs, the bar chart and the results workbook. Returns the paths
/// written, in order.
pub fn persist(result: &Tabulation, cfg: &TabulationConfig) -> Result<Vec<PathBuf>> {
    let out = &cfg.output_dir;
    ensure_output_dir(out)?;
    let mut written = Vec::new();

    let filtered_name = format!("filtrert_{}", cfg.min_year);
    let filtered_csv = out.join(format!("{filtered_name}.csv"));
    write_csv(&result.filtered, &filtered_csv)?;
    written.push(filtered_csv);

    let summary = match &result.aggregation {
        Some(agg) => agg.to_dataset(),
        None => Aggregation::empty_dataset(&cfg.category_column, &cfg.value_column),
    };
    let summary_csv = out.join(SUMMARY_CSV);
    write_csv(&summary, &summary_csv)?;
    written.push(summary_csv);

    if let Some(agg) = result.aggregation.as_ref().filter(|a| !a.is_empty()) {
        let bars: Vec<(String, f64)> = agg
            .groups
            .iter()
            .map(|(cat, sum)| {
                let label = match cat {
                    Value::Missing => "NaN".to_string(),
                    other => other.to_string(),
                };
                (label, *sum)
            })
            .collect();
        let chart_path = out.join(BAR_CHART);
        chart::bar_chart(
            &chart_path,
            &Labels {
                title: "Sum per kategori",
                x: "Kategori",
                y: "Beløp",
            },
            &bars,
        )?;
        info!("wrote {}", chart_path.display());
        written.push(chart_path);
    }

    let pivot = result.pivot.as_ref().map(Pivot::to_dataset);
    let mut sheets: Vec<(&str, &Dataset)> = vec![
        ("rådata", &result.data),
        (filtered_name.as_str(), &result.filtered),
    ];
    if result.aggregation.as_ref().is_some_and(|a| !a.is_empty()) {
        sheets.push(("oppsummering", &summary));
    }
    if let Some(pivot) = &pivot {
        sheets.push(("pivot", pivot));
    }
    let workbook = out.join(RESULTS_WORKBOOK);
    write_workbook(&workbook, &sheets)?;
    written.push(workbook);

    Ok(written)
}

/// Load the configured workbook and run the whole pipeline.
pub fn run(cfg: &TabulationConfig) -> Result<Vec<PathBuf>> {
    let raw = load_file(&cfg.input, cfg.sheet.as_deref())?;
    let result = analyse(raw, cfg)?;
    persist(&result, cfg)
}
