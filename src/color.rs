use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Components are in `0.0..=1.0`, ready for PDF fill colours.
pub fn generate_palette(n: usize) -> Vec<Srgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb
        })
        .collect()
}

/// Single accent colour used for scatter points.
pub fn accent() -> Srgb {
    let hsl = Hsl::new(210.0_f32, 0.7, 0.45);
    hsl.into_color()
}
