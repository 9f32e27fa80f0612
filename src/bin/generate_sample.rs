use anyhow::Result;
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Format, Workbook};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Ledger rows spanning 2023–2024 with a few unparseable cells mixed in.
fn write_ledger(rng: &mut SimpleRng, path: &str) -> Result<usize> {
    let categories = [
        ("Mat", 350.0),
        ("Reise", 900.0),
        ("Bolig", 2500.0),
        ("Fritid", 400.0),
    ];
    let start = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap_or_default();

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    sheet.set_name("Transaksjoner")?;
    for (col, header) in [" Dato ", "Kategori", "Beløp", "Kommentar"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    let rows = 120;
    for i in 0..rows {
        let row = i as u32 + 1;
        let day = start + Duration::days(rng.below(480) as i64);
        let (category, mean) = categories[rng.below(categories.len())];

        if i % 37 == 0 {
            sheet.write_string(row, 0, "ukjent")?;
        } else {
            let stamp = day.and_hms_opt(0, 0, 0).unwrap_or_default();
            sheet.write_datetime_with_format(row, 0, &stamp, &date_format)?;
        }
        sheet.write_string(row, 1, category)?;
        if i % 29 == 0 {
            sheet.write_string(row, 2, "n/a")?;
        } else {
            let amount = rng.gauss(mean, mean * 0.25).abs();
            sheet.write_number(row, 2, (amount * 100.0).round() / 100.0)?;
        }
        if i % 11 == 0 {
            sheet.write_string(row, 3, "kontant")?;
        }
    }

    workbook.save(path)?;
    Ok(rows)
}

/// Shoe size against height, roughly linear with noise.
fn write_measurements(rng: &mut SimpleRng, path: &str) -> Result<usize> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Målinger")?;
    for (col, header) in ["Navn", "Skostørrelse", "Høyde"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    let rows = 30;
    for i in 0..rows {
        let row = i as u32 + 1;
        let shoe = (rng.gauss(41.0, 3.0) * 2.0).round() / 2.0;
        let height = 60.0 + 2.8 * shoe + rng.gauss(0.0, 4.0);
        sheet.write_string(row, 0, format!("Elev {}", i + 1))?;
        sheet.write_number(row, 1, shoe)?;
        if i == 7 {
            sheet.write_string(row, 2, "mangler")?;
        } else {
            sheet.write_number(row, 2, height.round())?;
        }
    }

    workbook.save(path)?;
    Ok(rows)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let ledger = "data.xlsx";
    let n = write_ledger(&mut rng, ledger)?;
    println!("Wrote {n} ledger rows to {ledger}");

    let measurements = "maalinger.xlsx";
    let n = write_measurements(&mut rng, measurements)?;
    println!("Wrote {n} measurements to {measurements}");
    Ok(())
}
