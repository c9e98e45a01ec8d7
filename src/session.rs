// Per-session state: current dataset, axis selection and the single active chart

use crate::adapter::{adapt_selection, ChartType};
use crate::columns::{resolve_columns, ColumnChoice};
use crate::config::AdapterOptions;
use crate::data::{load, DataFormat, Dataset};
use crate::error::{ChartError, Result};
use crate::render::{ChartInstance, ChartRenderer};
use log::{info, warn};

/// Current selector state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub chart: ChartType,
    pub x: Option<String>,
    pub y: Option<String>,
}

/// What a render request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A new chart is active
    Drawn,
    /// No dataset loaded; nothing was touched
    NoData,
    /// Previous chart torn down, but no column selected
    MissingSelection,
}

/// One user session. Owns the dataset and at most one active chart.
pub struct Session<R: ChartRenderer> {
    renderer: R,
    options: AdapterOptions,
    dataset: Dataset,
    columns: ColumnChoice,
    selection: Selection,
    active: Option<R::Chart>,
}

impl<R: ChartRenderer> Session<R> {
    pub fn new(renderer: R, options: AdapterOptions) -> Self {
        Self {
            renderer,
            options,
            dataset: Dataset::default(),
            columns: ColumnChoice::default(),
            selection: Selection::default(),
            active: None,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn columns(&self) -> &ColumnChoice {
        &self.columns
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn active_chart(&self) -> Option<&R::Chart> {
        self.active.as_ref()
    }

    /// Parse new content and swap it in, resetting the selection to the default columns.
    ///
    /// On any failure the previous dataset, selection and chart are left untouched.
    pub fn load(&mut self, content: &str, mimetype: &str) -> Result<&ColumnChoice> {
        let format = DataFormat::from_mimetype(mimetype)?;
        let dataset = load(content, format)?;
        info!(
            "Loaded {} dataset: {} records, columns [{}]",
            format,
            dataset.len(),
            dataset.columns().join(", ")
        );

        self.columns = resolve_columns(&dataset);
        self.selection.x = self.columns.default_x.clone();
        self.selection.y = self.columns.default_y.clone();
        self.dataset = dataset;
        Ok(&self.columns)
    }

    /// Load fetched content, then render with the default columns
    pub fn ingest(&mut self, content: &str, mimetype: &str) -> Result<RenderOutcome> {
        self.load(content, mimetype)?;
        self.render()
    }

    pub fn set_chart_type(&mut self, chart: ChartType) {
        self.selection.chart = chart;
    }

    /// Point the selectors at new columns. Names not in the dataset are rejected.
    pub fn select_columns(&mut self, x: Option<&str>, y: Option<&str>) -> Result<()> {
        for column in [x, y].into_iter().flatten() {
            self.dataset.require_column(column)?;
        }
        if let Some(x) = x {
            self.selection.x = Some(x.to_string());
        }
        if let Some(y) = y {
            self.selection.y = Some(y.to_string());
        }
        Ok(())
    }

    /// Tear down the active chart, adapt the current selection, draw a replacement.
    pub fn render(&mut self) -> Result<RenderOutcome> {
        if self.dataset.is_empty() {
            info!("No data to render.");
            return Ok(RenderOutcome::NoData);
        }

        if let Some(previous) = self.active.take() {
            previous.destroy();
        }

        let series = match adapt_selection(
            &self.dataset,
            self.selection.chart,
            self.selection.x.as_deref(),
            self.selection.y.as_deref(),
            &self.options,
        ) {
            Ok(series) => series,
            Err(ChartError::MissingSelection) => {
                warn!("X or Y column not selected.");
                return Ok(RenderOutcome::MissingSelection);
            }
            Err(e) => return Err(e),
        };

        let chart = self.renderer.draw(&series)?;
        info!(
            "Rendered {:?} chart from {} records",
            self.selection.chart,
            series.len()
        );
        self.active = Some(chart);
        Ok(RenderOutcome::Drawn)
    }

    /// Tear down the active chart, if any
    pub fn clear(&mut self) {
        if let Some(previous) = self.active.take() {
            previous.destroy();
        }
    }
}
