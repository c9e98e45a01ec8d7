// Color palettes for series and pie slices

use plotters::style::{HSLColor, RGBColor};

/// Fill opacity shared by bars, areas and slices
pub const FILL_ALPHA: f64 = 0.6;

/// Scatter point color (steelblue)
pub const POINT_COLOR: RGBColor = RGBColor(70, 130, 180);

/// Fixed colors for labeled series
pub struct SeriesPalette {
    colors: Vec<RGBColor>,
}

impl SeriesPalette {
    /// Teal, orange, blue, then a few extra hues for additional grouped series
    pub fn standard() -> Self {
        SeriesPalette {
            colors: vec![
                RGBColor(75, 192, 192),
                RGBColor(255, 159, 64),
                RGBColor(54, 162, 235),
                RGBColor(255, 99, 132),
                RGBColor(153, 102, 255),
                RGBColor(255, 205, 86),
                RGBColor(201, 203, 207),
            ],
        }
    }

    /// Color for series `index` (wraps around)
    pub fn get_color(&self, index: usize) -> RGBColor {
        self.colors[index % self.colors.len()]
    }

    /// Line charts are drawn in blue
    pub fn line_color(&self) -> RGBColor {
        self.get_color(2)
    }
}

/// Distinguishable per-slice colors, spaced by the golden angle around the hue wheel
pub fn slice_colors(count: usize) -> Vec<HSLColor> {
    const GOLDEN_ANGLE: f64 = 0.381_966_011_250_105;
    (0..count)
        .map(|i| {
            let hue = (i as f64 * GOLDEN_ANGLE).fract();
            HSLColor(hue, 0.65, 0.55)
        })
        .collect()
}
