// Renderer seam between the session and the drawing library

use crate::adapter::{ChartType, SeriesData};
use crate::config::{OutputFormat, RenderOptions};
use crate::error::{ChartError, Result};
use crate::graph;
use log::debug;

/// A chart attached to the display. Must be destroyed before another is attached.
pub trait ChartInstance: Sized {
    /// Release whatever the chart holds
    fn destroy(self) {}
}

/// Draws shaped series data into a new chart instance
pub trait ChartRenderer {
    type Chart: ChartInstance;

    fn draw(&mut self, series: &SeriesData) -> Result<Self::Chart>;
}

/// An encoded chart image produced by [`PlottersRenderer`]
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub chart: ChartType,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl ChartInstance for RenderedChart {
    fn destroy(self) {
        debug!(
            "Releasing {:?} chart ({} bytes of {:?})",
            self.chart,
            self.bytes.len(),
            self.format
        );
    }
}

/// Renders with plotters into an in-memory PNG or SVG
#[derive(Debug, Clone, Default)]
pub struct PlottersRenderer {
    options: RenderOptions,
}

impl PlottersRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl ChartRenderer for PlottersRenderer {
    type Chart = RenderedChart;

    fn draw(&mut self, series: &SeriesData) -> Result<RenderedChart> {
        let bytes = graph::render(series, &self.options).map_err(ChartError::Render)?;
        Ok(RenderedChart {
            chart: series.chart_type(),
            format: self.options.format,
            bytes,
        })
    }
}
