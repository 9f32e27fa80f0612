use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::data::model::{Dataset, Value};

/// Create `dir` (and parents) unless it already exists.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}

/// Header row plus one record per row; missing cells are empty.
///
/// A dataset without columns is written as a single empty line.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    if dataset.columns.is_empty() {
        std::fs::write(path, "\n").with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {} (no columns)", path.display());
        return Ok(());
    }
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer
        .write_record(&dataset.columns)
        .context("writing CSV header")?;
    for row in &dataset.rows {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    info!("wrote {} ({} rows)", path.display(), dataset.len());
    Ok(())
}

/// Write each `(sheet name, dataset)` to its own worksheet, in order.
pub fn write_workbook(path: &Path, sheets: &[(&str, &Dataset)]) -> Result<()> {
    let mut workbook = Workbook::new();
    let formats = SheetFormats {
        header: Format::new().set_bold(),
        header_date: Format::new().set_bold().set_num_format("yyyy-mm-dd"),
        date: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
    };

    for (name, dataset) in sheets {
        let worksheet = workbook.add_worksheet();
        fill_sheet(worksheet, name, dataset, &formats)
            .with_context(|| format!("writing sheet '{name}'"))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    info!("wrote {} ({} sheets)", path.display(), sheets.len());
    Ok(())
}

struct SheetFormats {
    header: Format,
    header_date: Format,
    date: Format,
}

/// Header labels that are plain `YYYY-MM-DD` dates (pivot months).
fn header_date(label: &str) -> Option<NaiveDate> {
    if label.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(label, "%Y-%m-%d").ok()
}

fn fill_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    dataset: &Dataset,
    formats: &SheetFormats,
) -> Result<(), XlsxError> {
    worksheet.set_name(name)?;
    for (col, label) in dataset.columns.iter().enumerate() {
        let col = col as u16;
        match header_date(label).and_then(|d| d.and_hms_opt(0, 0, 0)) {
            Some(stamp) => {
                worksheet.write_datetime_with_format(0, col, &stamp, &formats.header_date)?;
            }
            None => {
                worksheet.write_string_with_format(0, col, label, &formats.header)?;
            }
        }
    }
    for (r, row) in dataset.rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (c, value) in row.iter().enumerate() {
            let c = c as u16;
            match value {
                Value::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Value::Integer(i) => {
                    worksheet.write_number(r, c, *i as f64)?;
                }
                Value::Float(f) => {
                    worksheet.write_number(r, c, *f)?;
                }
                Value::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                Value::Date(d) => {
                    worksheet.write_datetime_with_format(r, c, d, &formats.date)?;
                }
                Value::Missing => {}
            }
        }
    }
    Ok(())
}

/// Write a plain-text file.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}
