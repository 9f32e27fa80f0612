use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::model::Dataset;
use crate::error::AnalysisError;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w_]").unwrap());

/// Normalize one column label: trim, collapse whitespace runs to `_`, strip
/// everything that is not a (Unicode) word character, lowercase.
///
/// `" Dato "` → `dato`, `"Beløp (NOK)"` → `beløp_nok`. Applying it twice
/// gives the same result as applying it once.
pub fn normalize_name(name: &str) -> String {
    let underscored = WHITESPACE.replace_all(name.trim(), "_");
    NON_WORD.replace_all(&underscored, "").to_lowercase()
}

/// Rename every column with [`normalize_name`].
///
/// Two different labels that normalize to the same name are a
/// [`AnalysisError::ColumnCollision`].
pub fn normalize_columns(mut dataset: Dataset) -> Result<Dataset, AnalysisError> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    let mut renamed = Vec::with_capacity(dataset.columns.len());
    for original in &dataset.columns {
        let name = normalize_name(original);
        if let Some(first) = seen.get(&name) {
            return Err(AnalysisError::ColumnCollision {
                name,
                first: first.clone(),
                second: original.clone(),
            });
        }
        seen.insert(name.clone(), original.clone());
        renamed.push(name);
    }
    dataset.columns = renamed;
    Ok(dataset)
}

/// Apply `(from, to)` renames. Sources that are absent are skipped; renaming
/// onto another existing column is a collision.
pub fn rename_columns(
    mut dataset: Dataset,
    renames: &[(&str, &str)],
) -> Result<Dataset, AnalysisError> {
    for &(from, to) in renames {
        let Some(idx) = dataset.column_index(from) else {
            continue;
        };
        if from == to {
            continue;
        }
        if dataset.has_column(to) {
            return Err(AnalysisError::ColumnCollision {
                name: to.to_string(),
                first: to.to_string(),
                second: from.to_string(),
            });
        }
        dataset.columns[idx] = to.to_string();
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize_name(" Dato "), "dato");
        assert_eq!(normalize_name("KATEGORI"), "kategori");
    }

    #[test]
    fn punctuation_is_stripped_after_underscoring() {
        assert_eq!(normalize_name("Beløp (NOK)"), "beløp_nok");
        assert_eq!(normalize_name("Sum  i\tkr."), "sum_i_kr");
        assert_eq!(normalize_name("Unnamed: 3"), "unnamed_3");
    }

    #[test]
    fn non_ascii_letters_are_word_characters() {
        assert_eq!(normalize_name("Høyde"), "høyde");
        assert_eq!(normalize_name("Skostørrelse"), "skostørrelse");
        assert_eq!(normalize_name("Måned"), "måned");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [" Dato ", "Beløp (NOK)", "a - b", "Å_ø  Æ!", "x__y", ""] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn collision_fails_fast() {
        let ds = Dataset::empty_with_columns(["Beløp", " beløp"]);
        let err = normalize_columns(ds).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::ColumnCollision { ref name, .. } if name == "beløp"
        ));
    }

    #[test]
    fn rename_skips_absent_and_detects_clash() {
        let ds = Dataset::empty_with_columns(["skostørrelse", "høyde"]);
        let ds = rename_columns(ds, &[("skostørrelse", "sko"), ("vekt", "vekt_kg")]).unwrap();
        assert_eq!(ds.columns, vec!["sko", "høyde"]);

        let clash = rename_columns(ds, &[("høyde", "sko")]);
        assert!(clash.is_err());
    }
}
