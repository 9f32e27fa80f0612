use chrono::Datelike;

use super::model::Dataset;

/// Keep rows whose `date_column` falls in `threshold` or later.
///
/// Rows with a missing date are dropped. When the dataset has no such
/// column the result is a full copy of the input.
pub fn filter_by_year(dataset: &Dataset, date_column: &str, threshold: i32) -> Dataset {
    let Some(idx) = dataset.column_index(date_column) else {
        return dataset.clone();
    };
    Dataset {
        columns: dataset.columns.clone(),
        rows: dataset
            .rows
            .iter()
            .filter(|row| {
                row[idx]
                    .as_date()
                    .is_some_and(|d| d.year() >= threshold)
            })
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec!["dato".into(), "beløp".into()],
            vec![
                vec![date(2023, 12, 31), Value::Float(1.0)],
                vec![date(2024, 1, 1), Value::Float(2.0)],
                vec![Value::Missing, Value::Float(3.0)],
                vec![date(2025, 6, 1), Value::Float(4.0)],
            ],
        )
    }

    #[test]
    fn keeps_threshold_year_and_later() {
        let ds = sample();
        let out = filter_by_year(&ds, "dato", 2024);
        assert_eq!(out.len(), 2);
        assert_eq!(out.columns, ds.columns);
        for row in &out.rows {
            assert!(row[0].as_date().unwrap().year() >= 2024);
            assert!(ds.rows.contains(row));
        }
    }

    #[test]
    fn output_is_subset_for_every_threshold() {
        let ds = sample();
        for threshold in 2020..2030 {
            let out = filter_by_year(&ds, "dato", threshold);
            assert!(out.rows.iter().all(|r| ds.rows.contains(r)));
            assert!(out
                .rows
                .iter()
                .all(|r| r[0].as_date().unwrap().year() >= threshold));
        }
    }

    #[test]
    fn absent_date_column_is_identity() {
        let ds = Dataset::new(vec!["beløp".into()], vec![vec![Value::Float(1.0)]]);
        assert_eq!(filter_by_year(&ds, "dato", 2024), ds);
    }
}
