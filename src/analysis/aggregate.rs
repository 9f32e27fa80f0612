use std::collections::BTreeMap;

use crate::data::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// Aggregation – sum of one numeric column per category
// ---------------------------------------------------------------------------

/// Per-category sums, ordered by descending sum.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub category_column: String,
    pub value_column: String,
    /// `(category, sum)` pairs. A missing category is a group of its own.
    pub groups: Vec<(Value, f64)>,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Two-column table `[category, value]`.
    pub fn to_dataset(&self) -> Dataset {
        Dataset {
            columns: vec![self.category_column.clone(), self.value_column.clone()],
            rows: self
                .groups
                .iter()
                .map(|(cat, sum)| vec![cat.clone(), Value::Float(*sum)])
                .collect(),
        }
    }

    /// The zero-row table written when aggregation was not possible.
    pub fn empty_dataset(category_column: &str, value_column: &str) -> Dataset {
        Dataset::empty_with_columns([category_column, value_column])
    }
}

/// Sum `value_column` per distinct `category_column` value.
///
/// Returns `None` unless both columns are present. Missing numeric cells
/// contribute nothing to their group's sum.
pub fn aggregate_by_category(
    dataset: &Dataset,
    category_column: &str,
    value_column: &str,
) -> Option<Aggregation> {
    let cat_idx = dataset.column_index(category_column)?;
    let val_idx = dataset.column_index(value_column)?;

    let mut sums: BTreeMap<&Value, f64> = BTreeMap::new();
    let mut missing_sum: Option<f64> = None;
    for row in &dataset.rows {
        let amount = row[val_idx].as_f64().unwrap_or(0.0);
        match &row[cat_idx] {
            Value::Missing => *missing_sum.get_or_insert(0.0) += amount,
            cat => *sums.entry(cat).or_insert(0.0) += amount,
        }
    }

    let mut groups: Vec<(Value, f64)> = sums
        .into_iter()
        .map(|(cat, sum)| (cat.clone(), sum))
        .chain(missing_sum.map(|sum| (Value::Missing, sum)))
        .collect();
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));

    Some(Aggregation {
        category_column: category_column.to_string(),
        value_column: value_column.to_string(),
        groups,
    })
}
