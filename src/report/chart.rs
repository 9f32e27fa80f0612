use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use palette::Srgb;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

use crate::analysis::LinearFit;
use crate::color::{accent, generate_palette};

// A4 landscape, all lengths in millimetres.
const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const PLOT_LEFT: f32 = 35.0;
const PLOT_RIGHT: f32 = PAGE_W - 15.0;
const PLOT_BOTTOM: f32 = 40.0;
const PLOT_TOP: f32 = PAGE_H - 30.0;

const PT_TO_MM: f32 = 0.3528;

/// Title and axis captions of a chart.
#[derive(Debug, Clone, Copy)]
pub struct Labels<'a> {
    pub title: &'a str,
    pub x: &'a str,
    pub y: &'a str,
}

// ---------------------------------------------------------------------------
// Public charts
// ---------------------------------------------------------------------------

/// Vertical bar chart, one bar per `(label, value)` in the given order.
pub fn bar_chart(path: &Path, labels: &Labels, bars: &[(String, f64)]) -> Result<()> {
    let (doc, canvas) = Canvas::new(labels.title)?;

    let lo = bars.iter().map(|b| b.1).fold(0.0_f64, f64::min);
    let hi = bars.iter().map(|b| b.1).fold(0.0_f64, f64::max);
    let (lo, hi) = if lo == hi { (0.0, 1.0) } else { (lo, hi) };
    let y_ticks = nice_ticks(lo, hi, 6);
    let y_scale = Scale::new(
        y_ticks.first().copied().unwrap_or(lo).min(lo),
        y_ticks.last().copied().unwrap_or(hi).max(hi),
        PLOT_BOTTOM,
        PLOT_TOP,
    );

    canvas.frame(labels);
    canvas.y_ticks(&y_scale, &y_ticks);

    let slot = (PLOT_RIGHT - PLOT_LEFT) / bars.len().max(1) as f32;
    let bar_w = slot * 0.7;
    let zero = y_scale.map(0.0);
    let colours = generate_palette(bars.len());
    for (i, ((label, value), colour)) in bars.iter().zip(colours).enumerate() {
        let x0 = PLOT_LEFT + slot * i as f32 + (slot - bar_w) / 2.0;
        let top = y_scale.map(*value);
        canvas.fill(
            &[(x0, zero), (x0 + bar_w, zero), (x0 + bar_w, top), (x0, top)],
            colour,
        );

        let size = 8.0;
        let max_chars = ((slot / (size * 0.5 * PT_TO_MM)) as usize).max(3);
        let shown = truncate(label, max_chars);
        canvas.text_centered(&shown, size, x0 + bar_w / 2.0, PLOT_BOTTOM - 6.0);
    }
    canvas.stroke(&[(PLOT_LEFT, zero), (PLOT_RIGHT, zero)], black(), 0.6);

    save(doc, path)
}

/// Scatter plot of `points` with the fitted line drawn across their x range.
pub fn scatter_with_fit(
    path: &Path,
    labels: &Labels,
    points: &[(f64, f64)],
    fit: &LinearFit,
) -> Result<()> {
    let (doc, canvas) = Canvas::new(labels.title)?;

    let (x_lo, x_hi) = padded_range(points.iter().map(|p| p.0));
    let fitted = [fit.predict(x_lo), fit.predict(x_hi)];
    let (y_lo, y_hi) = padded_range(points.iter().map(|p| p.1).chain(fitted));
    let x_ticks = nice_ticks(x_lo, x_hi, 8);
    let y_ticks = nice_ticks(y_lo, y_hi, 6);
    let x_scale = Scale::new(x_lo, x_hi, PLOT_LEFT, PLOT_RIGHT);
    let y_scale = Scale::new(y_lo, y_hi, PLOT_BOTTOM, PLOT_TOP);

    canvas.frame(labels);
    canvas.y_ticks(&y_scale, &y_ticks);
    canvas.x_ticks(&x_scale, &x_ticks);

    let marker = 1.2;
    let colour = accent();
    for &(x, y) in points {
        let (px, py) = (x_scale.map(x), y_scale.map(y));
        canvas.fill(
            &[(px - marker, py), (px, py - marker), (px + marker, py), (px, py + marker)],
            colour,
        );
    }

    let line_colour = Srgb::new(0.8, 0.15, 0.15);
    canvas.stroke(
        &[
            (x_scale.map(x_lo), y_scale.map(fitted[0])),
            (x_scale.map(x_hi), y_scale.map(fitted[1])),
        ],
        line_colour,
        1.2,
    );

    let r2 = fit
        .r_squared
        .map(|r| format!("{r:.4}"))
        .unwrap_or_else(|| "udefinert".to_string());
    let legend_x = PLOT_LEFT + 5.0;
    canvas.fill(
        &[
            (legend_x - marker, PLOT_TOP - 6.0),
            (legend_x, PLOT_TOP - 6.0 - marker),
            (legend_x + marker, PLOT_TOP - 6.0),
            (legend_x, PLOT_TOP - 6.0 + marker),
        ],
        colour,
    );
    canvas.text(
        &format!("Datapunkter (n = {})", fit.n),
        9.0,
        legend_x + 4.0,
        PLOT_TOP - 7.0,
    );
    canvas.stroke(
        &[(legend_x - 2.0, PLOT_TOP - 12.0), (legend_x + 2.0, PLOT_TOP - 12.0)],
        line_colour,
        1.2,
    );
    canvas.text(
        &format!(
            "y = {:.3} + {:.3}x   (R² = {r2})",
            fit.intercept, fit.slope
        ),
        9.0,
        legend_x + 4.0,
        PLOT_TOP - 13.0,
    );

    save(doc, path)
}

// ---------------------------------------------------------------------------
// Scales and ticks
// ---------------------------------------------------------------------------

/// Linear map from data space to page millimetres.
struct Scale {
    lo: f64,
    hi: f64,
    start: f32,
    end: f32,
}

impl Scale {
    fn new(lo: f64, hi: f64, start: f32, end: f32) -> Self {
        Scale { lo, hi, start, end }
    }

    fn map(&self, v: f64) -> f32 {
        let t = if self.hi > self.lo {
            (v - self.lo) / (self.hi - self.lo)
        } else {
            0.5
        };
        self.start + (self.end - self.start) * t as f32
    }
}

/// Data range of `values` widened by 5 % on each side; a degenerate range is
/// widened by ±1.
fn padded_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Round tick positions (steps of 1, 2 or 5 × 10ⁿ) covering `lo..=hi`.
fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if !(span > 0.0) || !span.is_finite() {
        return vec![lo];
    }
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).floor() * step;
    let mut ticks = Vec::new();
    let mut i = 0;
    loop {
        let t = first + step * i as f64;
        if t > hi + step * 0.5 {
            break;
        }
        ticks.push(t);
        i += 1;
    }
    ticks
}

fn format_tick(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e12 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn truncate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut out: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ---------------------------------------------------------------------------
// Drawing primitives
// ---------------------------------------------------------------------------

/// One page, one layer, one font.
struct Canvas {
    layer: PdfLayerReference,
    font: IndirectFontRef,
}

impl Canvas {
    fn new(title: &str) -> Result<(PdfDocumentReference, Canvas)> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "chart");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("loading PDF font: {e:?}"))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok((doc, Canvas { layer, font }))
    }

    fn stroke(&self, pts: &[(f32, f32)], colour: Srgb, width: f32) {
        self.layer.set_outline_color(pdf_colour(colour));
        self.layer.set_outline_thickness(width);
        self.layer.add_line(Line {
            points: to_points(pts),
            is_closed: false,
        });
    }

    fn fill(&self, pts: &[(f32, f32)], colour: Srgb) {
        self.layer.set_fill_color(pdf_colour(colour));
        self.layer.add_polygon(Polygon {
            rings: vec![to_points(pts)],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.set_fill_color(pdf_colour(black()));
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.font);
    }

    fn text_centered(&self, text: &str, size: f32, x: f32, y: f32) {
        self.text(text, size, x - text_width(text, size) / 2.0, y);
    }

    fn text_right(&self, text: &str, size: f32, x: f32, y: f32) {
        self.text(text, size, x - text_width(text, size), y);
    }

    /// Title, axis lines and axis captions.
    fn frame(&self, labels: &Labels) {
        self.text_centered(labels.title, 16.0, PAGE_W / 2.0, PAGE_H - 18.0);
        self.stroke(
            &[(PLOT_LEFT, PLOT_TOP), (PLOT_LEFT, PLOT_BOTTOM), (PLOT_RIGHT, PLOT_BOTTOM)],
            black(),
            0.8,
        );
        self.text_centered(
            labels.x,
            11.0,
            (PLOT_LEFT + PLOT_RIGHT) / 2.0,
            PLOT_BOTTOM - 18.0,
        );
        self.text(labels.y, 11.0, PLOT_LEFT - 25.0, PLOT_TOP + 5.0);
    }

    fn y_ticks(&self, scale: &Scale, ticks: &[f64]) {
        let grid = Srgb::new(0.85, 0.85, 0.85);
        for &t in ticks {
            let y = scale.map(t);
            if !(PLOT_BOTTOM..=PLOT_TOP + 0.01).contains(&y) {
                continue;
            }
            self.stroke(&[(PLOT_LEFT, y), (PLOT_RIGHT, y)], grid, 0.3);
            self.stroke(&[(PLOT_LEFT - 1.5, y), (PLOT_LEFT, y)], black(), 0.6);
            self.text_right(&format_tick(t), 8.0, PLOT_LEFT - 2.5, y - 1.0);
        }
    }

    fn x_ticks(&self, scale: &Scale, ticks: &[f64]) {
        for &t in ticks {
            let x = scale.map(t);
            if !(PLOT_LEFT..=PLOT_RIGHT + 0.01).contains(&x) {
                continue;
            }
            self.stroke(&[(x, PLOT_BOTTOM), (x, PLOT_BOTTOM - 1.5)], black(), 0.6);
            self.text_centered(&format_tick(t), 8.0, x, PLOT_BOTTOM - 6.0);
        }
    }
}

fn to_points(pts: &[(f32, f32)]) -> Vec<(Point, bool)> {
    pts.iter()
        .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
        .collect()
}

/// Rough Helvetica advance width: half the font size per character.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

fn black() -> Srgb {
    Srgb::new(0.0, 0.0, 0.0)
}

fn pdf_colour(c: Srgb) -> Color {
    Color::Rgb(Rgb::new(c.red, c.green, c.blue, None))
}

fn save(doc: PdfDocumentReference, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| anyhow!("writing {}: {e:?}", path.display()))
}
