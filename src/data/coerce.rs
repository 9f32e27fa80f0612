use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use super::model::{Dataset, Value};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Parse a cell as a number. Anything unparseable is `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Text(s) => s.trim().parse::<f64>().ok()?,
        Value::Date(_) | Value::Missing => return None,
    };
    v.is_finite().then_some(v)
}

/// Parse a cell as a timestamp. Anything unparseable is `None`.
pub fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Text(s) => parse_date_text(s),
        _ => None,
    }
}

/// ISO-8601 style timestamps and dates, plus `dd.mm.yyyy`.
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Convert every present column in `columns` to `Float`/`Missing`.
pub fn coerce_numeric(dataset: Dataset, columns: &[&str]) -> Dataset {
    coerce_with(dataset, columns, |v| {
        parse_number(v).map(Value::Float).unwrap_or(Value::Missing)
    })
}

/// Convert every present column in `columns` to `Date`/`Missing`.
pub fn coerce_dates(dataset: Dataset, columns: &[&str]) -> Dataset {
    coerce_with(dataset, columns, |v| {
        parse_date(v).map(Value::Date).unwrap_or(Value::Missing)
    })
}

fn coerce_with<F>(mut dataset: Dataset, columns: &[&str], parse: F) -> Dataset
where
    F: Fn(&Value) -> Value,
{
    for col in columns {
        let Some(idx) = dataset.column_index(col) else {
            continue;
        };
        let mut lost = 0usize;
        for row in &mut dataset.rows {
            let cell = &mut row[idx];
            let parsed = parse(cell);
            if parsed.is_missing() && !cell.is_missing() {
                lost += 1;
            }
            *cell = parsed;
        }
        if lost > 0 {
            debug!("column '{col}': {lost} cell(s) could not be converted and are now missing");
        }
    }
    dataset
}

/// Drop every row that is missing a value in any of `columns`.
/// Absent columns do not constrain anything.
pub fn drop_missing(mut dataset: Dataset, columns: &[&str]) -> Dataset {
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|c| dataset.column_index(c))
        .collect();
    dataset
        .rows
        .retain(|row| indices.iter().all(|&i| !row[i].is_missing()));
    dataset
}
