use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::data::model::{Dataset, Value};

/// Label of the margin row and column.
pub const MARGIN_LABEL: &str = "All";

/// Truncate a timestamp to midnight on the first of its month.
pub fn month_start(dt: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(dt)
}

// ---------------------------------------------------------------------------
// Pivot – category × month sums with margins
// ---------------------------------------------------------------------------

/// Sums of a numeric column cross-tabulated by category and month.
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    pub category_column: String,
    /// Distinct categories, ascending.
    pub categories: Vec<Value>,
    /// Distinct month starts, ascending.
    pub months: Vec<NaiveDateTime>,
    /// `cells[i][j]` is the sum for `categories[i]` in `months[j]`; 0 when no
    /// row matched.
    pub cells: Vec<Vec<f64>>,
}

impl Pivot {
    /// Total of one category across all months.
    pub fn row_total(&self, row: usize) -> f64 {
        self.cells[row].iter().sum()
    }

    /// Total of one month across all categories.
    pub fn column_total(&self, col: usize) -> f64 {
        self.cells.iter().map(|r| r[col]).sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    /// Flatten to a table: the category column, one column per month
    /// (`YYYY-MM-DD`), then the `All` margin column, with an `All` margin
    /// row last.
    pub fn to_dataset(&self) -> Dataset {
        let mut columns = vec![self.category_column.clone()];
        columns.extend(self.months.iter().map(|m| m.format("%Y-%m-%d").to_string()));
        columns.push(MARGIN_LABEL.to_string());

        let mut rows: Vec<Vec<Value>> = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, cat)| {
                let mut row = vec![cat.clone()];
                row.extend(self.cells[i].iter().map(|v| Value::Float(*v)));
                row.push(Value::Float(self.row_total(i)));
                row
            })
            .collect();

        let mut margin = vec![Value::Text(MARGIN_LABEL.to_string())];
        margin.extend((0..self.months.len()).map(|j| Value::Float(self.column_total(j))));
        margin.push(Value::Float(self.grand_total()));
        rows.push(margin);

        Dataset { columns, rows }
    }
}

/// Build a category × month pivot of `value_column`.
///
/// Returns `None` unless all three columns are present. Rows with a missing
/// category or date have no cell to land in and are left out; missing
/// amounts add nothing.
pub fn build_pivot(
    dataset: &Dataset,
    category_column: &str,
    value_column: &str,
    date_column: &str,
) -> Option<Pivot> {
    let cat_idx = dataset.column_index(category_column)?;
    let val_idx = dataset.column_index(value_column)?;
    let date_idx = dataset.column_index(date_column)?;

    let mut sums: BTreeMap<(&Value, NaiveDateTime), f64> = BTreeMap::new();
    let mut categories: BTreeSet<&Value> = BTreeSet::new();
    let mut months: BTreeSet<NaiveDateTime> = BTreeSet::new();

    for row in &dataset.rows {
        let cat = &row[cat_idx];
        if cat.is_missing() {
            continue;
        }
        let Some(date) = row[date_idx].as_date() else {
            continue;
        };
        let month = month_start(date);
        categories.insert(cat);
        months.insert(month);
        *sums.entry((cat, month)).or_insert(0.0) += row[val_idx].as_f64().unwrap_or(0.0);
    }

    let months: Vec<NaiveDateTime> = months.into_iter().collect();
    let cells = categories
        .iter()
        .map(|cat| {
            months
                .iter()
                .map(|m| sums.get(&(*cat, *m)).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    Some(Pivot {
        category_column: category_column.to_string(),
        categories: categories.into_iter().cloned().collect(),
        months,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn ledger() -> Dataset {
        Dataset::new(
            vec!["dato".into(), "kategori".into(), "beløp".into()],
            vec![
                vec![Value::Date(at(2024, 1, 5)), text("Mat"), Value::Float(100.0)],
                vec![Value::Date(at(2024, 1, 20)), text("Mat"), Value::Float(50.0)],
                vec![Value::Date(at(2024, 2, 2)), text("Reise"), Value::Float(300.0)],
                vec![Value::Date(at(2024, 3, 9)), text("Mat"), Value::Missing],
                vec![Value::Missing, text("Mat"), Value::Float(999.0)],
                vec![Value::Date(at(2024, 2, 9)), Value::Missing, Value::Float(999.0)],
            ],
        )
    }

    #[test]
    fn month_start_truncates() {
        assert_eq!(
            month_start(at(2024, 2, 29)),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn unmatched_cells_are_zero() {
        let pivot = build_pivot(&ledger(), "kategori", "beløp", "dato").unwrap();
        assert_eq!(pivot.categories, vec![text("Mat"), text("Reise")]);
        assert_eq!(pivot.months.len(), 3);
        assert_eq!(pivot.cells[0], vec![150.0, 0.0, 0.0]);
        assert_eq!(pivot.cells[1], vec![0.0, 300.0, 0.0]);
    }

    #[test]
    fn margins_hold_totals() {
        let pivot = build_pivot(&ledger(), "kategori", "beløp", "dato").unwrap();
        let ds = pivot.to_dataset();
        assert_eq!(
            ds.columns,
            vec!["kategori", "2024-01-01", "2024-02-01", "2024-03-01", "All"]
        );
        let margin = ds.rows.last().unwrap();
        assert_eq!(margin[0], text("All"));
        assert_eq!(margin[4], Value::Float(450.0));
        assert_eq!(pivot.grand_total(), 450.0);
        assert_eq!(ds.rows[0][4], Value::Float(150.0));
        assert_eq!(margin[2], Value::Float(300.0));
    }

    #[test]
    fn requires_all_three_columns() {
        let ds = ledger();
        assert!(build_pivot(&ds, "kategori", "beløp", "måned").is_none());
        assert!(build_pivot(&ds, "gruppe", "beløp", "dato").is_none());
    }
}
