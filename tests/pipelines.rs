use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use regneark_analyse::AnalysisError;
use regneark_analyse::config::{RegressionConfig, TabulationConfig};
use regneark_analyse::pipeline::{regression, tabulation};
use rust_xlsxwriter::{Format, Workbook};

fn ledger_workbook(path: &Path, with_category: bool) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, " Dato ").unwrap();
    sheet
        .write_string(0, 1, if with_category { "Kategori" } else { "Gruppe" })
        .unwrap();
    sheet.write_string(0, 2, "Beløp").unwrap();

    let rows = [
        ((2023, 11, 3), "Mat", 80.0),
        ((2024, 1, 5), "Mat", 120.0),
        ((2024, 1, 20), "Reise", 900.0),
        ((2024, 2, 2), "Mat", 60.0),
        ((2024, 2, 14), "Bolig", 2500.0),
    ];
    for (i, ((y, m, d), cat, amount)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        let stamp = NaiveDate::from_ymd_opt(*y, *m, *d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        sheet.write_datetime_with_format(r, 0, &stamp, &date_format).unwrap();
        sheet.write_string(r, 1, *cat).unwrap();
        sheet.write_number(r, 2, *amount).unwrap();
    }
    workbook.save(path).unwrap();
}

fn measurement_workbook(path: &Path, rows: &[(f64, Option<f64>)]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Skostørrelse").unwrap();
    sheet.write_string(0, 1, "Høyde").unwrap();
    for (i, (shoe, height)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_number(r, 0, *shoe).unwrap();
        match height {
            Some(h) => sheet.write_number(r, 1, *h).unwrap(),
            None => sheet.write_string(r, 1, "mangler").unwrap(),
        };
    }
    workbook.save(path).unwrap();
}

fn tabulation_config(dir: &Path) -> TabulationConfig {
    TabulationConfig {
        input: dir.join("data.xlsx"),
        output_dir: dir.join("utdata"),
        ..TabulationConfig::default()
    }
}

fn regression_config(dir: &Path) -> RegressionConfig {
    RegressionConfig {
        input: dir.join("maalinger.xlsx"),
        output_dir: dir.join("utdata"),
        ..RegressionConfig::default()
    }
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn tabulation_writes_every_output() {
    let dir = tempfile::tempdir().unwrap();
    ledger_workbook(&dir.path().join("data.xlsx"), true);
    let cfg = tabulation_config(dir.path());

    let written = tabulation::run(&cfg).unwrap();
    assert_eq!(
        file_names(&written),
        vec![
            "filtrert_2024.csv",
            "oppsummering_per_kategori.csv",
            "sum_per_kategori.pdf",
            "resultater.xlsx",
        ]
    );

    let filtered = std::fs::read_to_string(cfg.output_dir.join("filtrert_2024.csv")).unwrap();
    assert_eq!(filtered.lines().count(), 5);
    assert!(filtered.starts_with("dato,kategori,beløp\n"));
    assert!(!filtered.contains("2023-11-03"));

    let summary =
        std::fs::read_to_string(cfg.output_dir.join("oppsummering_per_kategori.csv")).unwrap();
    assert_eq!(
        summary,
        "kategori,beløp\nBolig,2500.0\nReise,900.0\nMat,180.0\n"
    );

    let mut workbook = open_workbook_auto(cfg.output_dir.join("resultater.xlsx")).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["rådata", "filtrert_2024", "oppsummering", "pivot"]
    );
    let raw = workbook.worksheet_range("rådata").unwrap();
    let header: Vec<Data> = raw.rows().next().unwrap().to_vec();
    assert_eq!(header.last(), Some(&Data::String("måned".into())));

    let pivot = workbook.worksheet_range("pivot").unwrap();
    let rows: Vec<&[Data]> = pivot.rows().collect();
    assert_eq!(rows[0].len(), 5);
    assert_eq!(rows[0][0], Data::String("kategori".into()));
    let months: Vec<_> = rows[0][1..4]
        .iter()
        .map(|cell| match cell {
            Data::DateTime(dt) => dt.as_datetime().unwrap().date(),
            other => panic!("expected a month date, got {other:?}"),
        })
        .collect();
    assert_eq!(
        months,
        vec![
            NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ]
    );
    assert_eq!(rows[0][4], Data::String("All".into()));
    let margin = rows.last().unwrap();
    assert_eq!(margin[0], Data::String("All".into()));
    assert_eq!(margin[4], Data::Float(3660.0));
}

#[test]
fn tabulation_without_category_skips_summary_and_pivot() {
    let dir = tempfile::tempdir().unwrap();
    ledger_workbook(&dir.path().join("data.xlsx"), false);
    let cfg = tabulation_config(dir.path());

    let written = tabulation::run(&cfg).unwrap();
    assert!(!file_names(&written).contains(&"sum_per_kategori.pdf".to_string()));

    let summary =
        std::fs::read_to_string(cfg.output_dir.join("oppsummering_per_kategori.csv")).unwrap();
    assert_eq!(summary, "kategori,beløp\n");

    let workbook = open_workbook_auto(cfg.output_dir.join("resultater.xlsx")).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["rådata", "filtrert_2024"]);
}

#[test]
fn missing_input_is_fatal_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = tabulation_config(dir.path());

    let err = tabulation::run(&cfg).unwrap_err();
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::InputMissing { path }) => {
            assert!(path.is_absolute());
            assert!(path.ends_with("data.xlsx"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!cfg.output_dir.exists());
}

#[test]
fn regression_writes_chart_report_and_data() {
    let dir = tempfile::tempdir().unwrap();
    measurement_workbook(
        &dir.path().join("maalinger.xlsx"),
        &[
            (38.0, Some(116.0)),
            (40.0, Some(122.0)),
            (42.0, None),
            (44.0, Some(134.0)),
            (46.0, Some(140.0)),
        ],
    );
    let cfg = regression_config(dir.path());

    let written = regression::run(&cfg).unwrap();
    assert_eq!(
        file_names(&written),
        vec![
            "regresjon_sko_vs_hoyde.pdf",
            "regresjon_parametre.txt",
            "raadata.xlsx",
        ]
    );

    let pdf = std::fs::read(cfg.output_dir.join("regresjon_sko_vs_hoyde.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let report = std::fs::read_to_string(cfg.output_dir.join("regresjon_parametre.txt")).unwrap();
    assert!(report.contains("hoyde = a + b * sko"));
    assert!(report.contains("a (konstantledd): 2.000000"));
    assert!(report.contains("b (stigningstall): 3.000000"));
    assert!(report.contains("R²: 1.000000"));
    assert!(report.contains("Antall punkter: 4"));

    let mut workbook = open_workbook_auto(cfg.output_dir.join("raadata.xlsx")).unwrap();
    let range = workbook.worksheet_range("raadata").unwrap();
    let rows: Vec<&[Data]> = range.rows().collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(
        rows[0],
        &[Data::String("sko".into()), Data::String("hoyde".into())]
    );
}

#[test]
fn regression_with_constant_response_reports_undefined_r_squared() {
    let dir = tempfile::tempdir().unwrap();
    measurement_workbook(
        &dir.path().join("maalinger.xlsx"),
        &[(38.0, Some(150.0)), (41.0, Some(150.0)), (44.0, Some(150.0))],
    );
    let cfg = regression_config(dir.path());

    regression::run(&cfg).unwrap();
    let report = std::fs::read_to_string(cfg.output_dir.join("regresjon_parametre.txt")).unwrap();
    assert!(report.contains("R²: udefinert"));
}

#[test]
fn regression_with_constant_predictor_still_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    measurement_workbook(
        &dir.path().join("maalinger.xlsx"),
        &[(40.0, Some(150.0)), (40.0, Some(160.0)), (40.0, Some(170.0))],
    );
    let cfg = regression_config(dir.path());

    let written = regression::run(&cfg).unwrap();
    assert_eq!(
        file_names(&written),
        vec![
            "regresjon_sko_vs_hoyde.pdf",
            "regresjon_parametre.txt",
            "raadata.xlsx",
        ]
    );
    let report = std::fs::read_to_string(cfg.output_dir.join("regresjon_parametre.txt")).unwrap();
    assert!(report.contains("a (konstantledd): 160.000000"));
    assert!(report.contains("b (stigningstall): 0.000000"));
    assert!(report.contains("R²: 0.000000"));
}

#[test]
fn regression_with_one_point_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    measurement_workbook(
        &dir.path().join("maalinger.xlsx"),
        &[(38.0, Some(150.0)), (41.0, None)],
    );
    let cfg = regression_config(dir.path());

    let err = regression::run(&cfg).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::TooFewPoints { found: 1 })
    ));
    assert!(!cfg.output_dir.exists());
}
