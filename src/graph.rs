// Chart drawing with plotters, encoded as PNG or SVG

use crate::adapter::{ChartType, LabeledSeries, ScatterSeries, SeriesData};
use crate::config::{OutputFormat, RenderOptions};
use crate::palette::{slice_colors, SeriesPalette, FILL_ALPHA, POINT_COLOR};
use anyhow::{bail, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::ops::Range;

/// Draw shaped series data and encode it in the requested format
pub fn render(series: &SeriesData, options: &RenderOptions) -> Result<Vec<u8>> {
    if options.width == 0 || options.height == 0 {
        bail!(
            "Chart dimensions must be non-zero, got {}x{}",
            options.width,
            options.height
        );
    }
    match options.format {
        OutputFormat::Png => render_png(series, options.width, options.height),
        OutputFormat::Svg => render_svg(series, options.width, options.height).map(String::into_bytes),
    }
}

fn render_png(series: &SeriesData, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; rgb_buffer_len(width, height)?];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw(&root, series)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

/// Bytes needed for an RGB8 canvas
fn rgb_buffer_len(width: u32, height: u32) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(3))
        .and_then(|len| usize::try_from(len).ok())
        .context("Chart dimensions too large")
}

fn render_svg(series: &SeriesData, width: u32, height: u32) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw(&root, series)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg)
}

fn draw<DB>(root: &DrawingArea<DB, Shift>, series: &SeriesData) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    match series {
        SeriesData::Labeled(data) => match data.chart {
            ChartType::Pie => draw_pie(root, data),
            ChartType::Line => draw_line(root, data),
            _ => draw_bars(root, data),
        },
        SeriesData::Scatter(data) => draw_scatter(root, data),
    }
}

// =============================================================================
// Ranges
// =============================================================================

/// Y range that always includes zero, padded 5% away from it
fn zero_based_range<'a>(values: impl Iterator<Item = &'a Option<f64>>) -> Range<f64> {
    let (lo, hi) = values
        .flatten()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if lo == hi {
        return lo..(hi + 1.0);
    }
    let padding = (hi - lo) * 0.05;
    let lo = if lo < 0.0 { lo - padding } else { lo };
    let hi = if hi > 0.0 { hi + padding } else { hi };
    lo..hi
}

/// Extent of the values, padded 5% each side
fn extent_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if min > max {
        0.0..1.0
    } else if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

/// Category slots centered on integer indices
fn category_range(count: usize) -> Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

// =============================================================================
// Categorical charts
// =============================================================================

fn draw_bars<DB>(root: &DrawingArea<DB, Shift>, data: &LabeledSeries) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let palette = SeriesPalette::standard();
    let y_range = zero_based_range(data.series.iter().flat_map(|s| s.values.iter()));
    let num_categories = data.labels.len();

    let mut builder = ChartBuilder::on(root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(50);
    if !data.title.is_empty() {
        builder.caption(&data.title, ("sans-serif", 20));
    }
    let mut chart = builder
        .build_cartesian_2d(category_range(num_categories), y_range)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_labels(num_categories.max(1))
        .x_label_formatter(&|x| category_label(&data.labels, *x))
        .x_desc(data.x_title.as_str())
        .y_desc(data.y_title.as_str())
        .disable_x_mesh()
        .draw()
        .context("Failed to draw mesh")?;

    // Side-by-side bars when there is more than one series
    let num_series = data.series.len().max(1);
    let bar_width = 0.8 / num_series as f64;

    for (series_idx, series) in data.series.iter().enumerate() {
        let color = palette.get_color(series_idx);
        let x_offset = (series_idx as f64 - (num_series as f64 - 1.0) / 2.0) * bar_width;

        let bars: Vec<[(f64, f64); 2]> = series
            .values
            .iter()
            .enumerate()
            .filter_map(|(cat_idx, value)| {
                let y_val = (*value)?;
                let x_center = cat_idx as f64 + x_offset;
                Some([
                    (x_center - bar_width / 2.0, 0.0),
                    (x_center + bar_width / 2.0, y_val),
                ])
            })
            .collect();

        chart
            .draw_series(
                bars.iter()
                    .map(|corners| Rectangle::new(*corners, color.mix(FILL_ALPHA).filled())),
            )
            .context("Failed to draw bars")?
            .label(series.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        chart
            .draw_series(
                bars.iter()
                    .map(|corners| Rectangle::new(*corners, color.stroke_width(1))),
            )
            .context("Failed to draw bar borders")?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .context("Failed to draw legend")?;

    Ok(())
}

fn draw_line<DB>(root: &DrawingArea<DB, Shift>, data: &LabeledSeries) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let palette = SeriesPalette::standard();
    let y_range = zero_based_range(data.series.iter().flat_map(|s| s.values.iter()));
    let num_categories = data.labels.len();

    let mut builder = ChartBuilder::on(root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(50);
    if !data.title.is_empty() {
        builder.caption(&data.title, ("sans-serif", 20));
    }
    let mut chart = builder
        .build_cartesian_2d(category_range(num_categories), y_range)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_labels(num_categories.max(1))
        .x_label_formatter(&|x| category_label(&data.labels, *x))
        .x_desc(data.x_title.as_str())
        .y_desc(data.y_title.as_str())
        .draw()
        .context("Failed to draw mesh")?;

    let color = palette.line_color();

    for series in &data.series {
        // Missing values break the line into separate segments
        let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
        for (idx, value) in series.values.iter().enumerate() {
            match value {
                Some(v) => {
                    if let Some(current) = segments.last_mut() {
                        current.push((idx as f64, *v));
                    }
                }
                None => {
                    if segments.last().is_some_and(|s| !s.is_empty()) {
                        segments.push(Vec::new());
                    }
                }
            }
        }
        segments.retain(|s| !s.is_empty());

        for (seg_idx, segment) in segments.into_iter().enumerate() {
            let anno = chart
                .draw_series(
                    AreaSeries::new(segment, 0.0, color.mix(0.2))
                        .border_style(color.stroke_width(2)),
                )
                .context("Failed to draw line series")?;
            if seg_idx == 0 {
                anno.label(series.name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .context("Failed to draw legend")?;

    Ok(())
}

fn draw_pie<DB>(root: &DrawingArea<DB, Shift>, data: &LabeledSeries) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let area = if data.title.is_empty() {
        root.clone()
    } else {
        root.titled(&data.title, ("sans-serif", 20).into_font())
            .context("Failed to draw title")?
    };

    let values: Vec<Option<f64>> = data
        .series
        .first()
        .map(|s| s.values.clone())
        .unwrap_or_default();
    let colors = slice_colors(values.len());

    // Legend down the left edge
    for (idx, (label, color)) in data.labels.iter().zip(&colors).enumerate() {
        let y = 10 + idx as i32 * 20;
        area.draw(&Rectangle::new([(10, y), (24, y + 12)], color.mix(0.7).filled()))
            .context("Failed to draw legend swatch")?;
        area.draw(&Text::new(label.clone(), (30, y), ("sans-serif", 14).into_font()))
            .context("Failed to draw legend label")?;
    }

    // Negative and missing values have no meaningful slice
    let total: f64 = values.iter().flatten().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let (width, height) = area.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = f64::from(width.min(height)) * 0.4;

    // Start at twelve o'clock and go clockwise
    let mut start = -PI / 2.0;
    for (value, color) in values.iter().zip(&colors) {
        let Some(value) = (*value).filter(|v| *v > 0.0) else {
            continue;
        };
        let sweep = value / total * 2.0 * PI;
        let steps = ((sweep / (2.0 * PI)) * 180.0).ceil().max(2.0) as usize;

        let mut points = vec![(center.0 as i32, center.1 as i32)];
        points.extend((0..=steps).map(|i| {
            let angle = start + sweep * i as f64 / steps as f64;
            (
                (center.0 + radius * angle.cos()).round() as i32,
                (center.1 + radius * angle.sin()).round() as i32,
            )
        }));

        area.draw(&Polygon::new(points.clone(), color.mix(0.7).filled()))
            .context("Failed to draw slice")?;
        points.push(points[0]);
        area.draw(&PathElement::new(points, WHITE.stroke_width(1)))
            .context("Failed to draw slice border")?;

        start += sweep;
    }

    Ok(())
}

// =============================================================================
// Scatter
// =============================================================================

fn draw_scatter<DB>(root: &DrawingArea<DB, Shift>, data: &ScatterSeries) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let points: Vec<(f64, f64)> = data.points.iter().filter_map(|p| p.coords()).collect();
    let x_range = extent_range(points.iter().map(|p| p.0));
    let y_range = extent_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_desc(data.x_title.as_str())
        .y_desc(data.y_title.as_str())
        .draw()
        .context("Failed to draw mesh")?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 5, POINT_COLOR.mix(0.7).filled())),
        )
        .context("Failed to draw point series")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ScatterPoint, Series};

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    fn labeled(chart: ChartType, values: Vec<Vec<Option<f64>>>) -> SeriesData {
        SeriesData::Labeled(LabeledSeries {
            chart,
            title: "Test".to_string(),
            x_title: "x".to_string(),
            y_title: "y".to_string(),
            labels: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            series: values
                .into_iter()
                .enumerate()
                .map(|(i, values)| Series { name: format!("s{}", i), values })
                .collect(),
        })
    }

    fn svg_options() -> RenderOptions {
        RenderOptions {
            format: OutputFormat::Svg,
            ..RenderOptions::default()
        }
    }

    // Range tests

    #[test]
    fn test_zero_based_range_positive() {
        let values = [Some(10.0), None, Some(20.0)];
        let range = zero_based_range(values.iter());
        assert_eq!(range.start, 0.0);
        assert!((range.end - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_based_range_negative_and_empty() {
        let values = [Some(-10.0), Some(10.0)];
        let range = zero_based_range(values.iter());
        assert!((range.start + 11.0).abs() < 1e-9);
        assert!((range.end - 11.0).abs() < 1e-9);

        let empty: [Option<f64>; 1] = [None];
        assert_eq!(zero_based_range(empty.iter()), 0.0..1.0);
    }

    #[test]
    fn test_extent_range() {
        assert_eq!(extent_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(extent_range([5.0].into_iter()), 4.0..6.0);
        let r = extent_range([0.0, 100.0].into_iter());
        assert_eq!(r, -5.0..105.0);
    }

    #[test]
    fn test_category_label() {
        let labels = vec!["CA".to_string(), "NY".to_string()];
        assert_eq!(category_label(&labels, 0.0), "CA");
        assert_eq!(category_label(&labels, 1.0), "NY");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    // Rendering tests

    #[test]
    fn test_rgb_buffer_len() {
        assert_eq!(rgb_buffer_len(800, 600).unwrap(), 1_440_000);
        assert!(rgb_buffer_len(u32::MAX, 2).is_err());
    }

    #[test]
    fn test_render_rejects_oversized_dimensions() {
        let data = labeled(ChartType::Bar, vec![vec![Some(1.0), Some(2.0), Some(3.0)]]);
        let options = RenderOptions {
            width: 70_000,
            height: 70_000,
            format: OutputFormat::Png,
        };
        let err = render(&data, &options).unwrap_err();
        assert!(err.to_string().contains("too large"), "got {}", err);
    }

    #[test]
    fn test_render_rejects_zero_dimensions() {
        let data = labeled(ChartType::Bar, vec![vec![Some(1.0), Some(2.0), Some(3.0)]]);
        for format in [OutputFormat::Png, OutputFormat::Svg] {
            let options = RenderOptions { width: 0, height: 600, format };
            let err = render(&data, &options).unwrap_err();
            assert!(err.to_string().contains("non-zero"), "got {}", err);
        }
    }

    #[test]
    fn test_render_bar_png() {
        let data = labeled(ChartType::Bar, vec![vec![Some(1.0), None, Some(3.0)]]);
        let bytes = render(&data, &RenderOptions::default()).unwrap();
        assert!(is_valid_png(&bytes));
    }

    #[test]
    fn test_render_grouped_bar_svg() {
        let data = labeled(
            ChartType::GroupedBar,
            vec![vec![Some(1.0), Some(2.0), Some(3.0)], vec![Some(3.0), Some(2.0), None]],
        );
        let bytes = render(&data, &svg_options()).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_render_line_with_gap_svg() {
        let data = labeled(ChartType::Line, vec![vec![Some(1.0), None, Some(3.0)]]);
        let bytes = render(&data, &svg_options()).unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("<svg"));
    }

    #[test]
    fn test_render_pie_svg() {
        let data = labeled(ChartType::Pie, vec![vec![Some(1.0), Some(-2.0), Some(3.0)]]);
        let bytes = render(&data, &svg_options()).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn test_render_pie_all_missing() {
        let data = labeled(ChartType::Pie, vec![vec![None, None, None]]);
        assert!(render(&data, &svg_options()).is_ok());
    }

    #[test]
    fn test_render_scatter_png() {
        let data = SeriesData::Scatter(ScatterSeries {
            x_title: "h".to_string(),
            y_title: "w".to_string(),
            points: vec![
                ScatterPoint { x: Some(1.0), y: Some(2.0) },
                ScatterPoint { x: None, y: Some(3.0) },
                ScatterPoint { x: Some(4.0), y: Some(8.0) },
            ],
        });
        let bytes = render(&data, &RenderOptions::default()).unwrap();
        assert!(is_valid_png(&bytes));
    }
}
