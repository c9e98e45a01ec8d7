// Chart data adapter: shapes dataset columns into renderer-ready series

use crate::coerce::{coerce_cell, coerce_numeric, coerce_strict_numeric};
use crate::config::{AdapterOptions, CoercionPolicy};
use crate::data::Dataset;
use crate::error::{ChartError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Scatter,
    Pie,
    GroupedBar,
}

/// A validated chart request. Grouped bars carry their series columns instead of a y column.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bar { x: String, y: String },
    Line { x: String, y: String },
    Scatter { x: String, y: String },
    Pie { x: String, y: String },
    GroupedBar { x: String, series: Vec<String> },
}

impl ChartSpec {
    /// Build a spec from the current selector state.
    ///
    /// Both selectors must be set, even for grouped bars where y is unused.
    pub fn from_selection(
        chart: ChartType,
        x: Option<&str>,
        y: Option<&str>,
        options: &AdapterOptions,
    ) -> Result<Self> {
        let (x, y) = match (non_empty(x), non_empty(y)) {
            (Some(x), Some(y)) => (x.to_string(), y.to_string()),
            _ => return Err(ChartError::MissingSelection),
        };

        Ok(match chart {
            ChartType::Bar => ChartSpec::Bar { x, y },
            ChartType::Line => ChartSpec::Line { x, y },
            ChartType::Scatter => ChartSpec::Scatter { x, y },
            ChartType::Pie => ChartSpec::Pie { x, y },
            ChartType::GroupedBar => ChartSpec::GroupedBar {
                x,
                series: options.group_columns.clone(),
            },
        })
    }

    pub fn chart_type(&self) -> ChartType {
        match self {
            ChartSpec::Bar { .. } => ChartType::Bar,
            ChartSpec::Line { .. } => ChartType::Line,
            ChartSpec::Scatter { .. } => ChartType::Scatter,
            ChartSpec::Pie { .. } => ChartType::Pie,
            ChartSpec::GroupedBar { .. } => ChartType::GroupedBar,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// One named value array; `None` marks a cell that failed coercion
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Category labels with one or more aligned value series (bar, line, pie, grouped bar)
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSeries {
    pub chart: ChartType,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl ScatterPoint {
    /// Both coordinates, if both coerced
    pub fn coords(&self) -> Option<(f64, f64)> {
        Some((self.x?, self.y?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub x_title: String,
    pub y_title: String,
    pub points: Vec<ScatterPoint>,
}

/// Adapter output, consumed once by the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Labeled(LabeledSeries),
    Scatter(ScatterSeries),
}

impl SeriesData {
    pub fn chart_type(&self) -> ChartType {
        match self {
            SeriesData::Labeled(l) => l.chart,
            SeriesData::Scatter(_) => ChartType::Scatter,
        }
    }

    /// Number of records represented (one label or point per record)
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Labeled(l) => l.labels.len(),
            SeriesData::Scatter(s) => s.points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shape `dataset` for the requested chart.
///
/// Output arrays have one entry per record, in record order.
pub fn adapt(dataset: &Dataset, spec: &ChartSpec, policy: CoercionPolicy) -> Result<SeriesData> {
    match spec {
        ChartSpec::Bar { x, y } => labeled(
            dataset,
            ChartType::Bar,
            x,
            &[(format!("{} by {}", y, x), y.as_str())],
            LabeledTitles::axes(String::new(), x, y),
            policy,
        ),
        ChartSpec::Line { x, y } => labeled(
            dataset,
            ChartType::Line,
            x,
            &[(format!("{} over {}", y, x), y.as_str())],
            LabeledTitles::axes(String::new(), x, y),
            policy,
        ),
        ChartSpec::Pie { x, y } => labeled(
            dataset,
            ChartType::Pie,
            x,
            &[(y.clone(), y.as_str())],
            LabeledTitles::axes(format!("{} Distribution by {}", y, x), x, y),
            policy,
        ),
        ChartSpec::GroupedBar { x, series } => {
            let columns: Vec<(String, &str)> =
                series.iter().map(|c| (c.clone(), c.as_str())).collect();
            let title = format!("{} by {}", series.join(" vs. "), x);
            labeled(
                dataset,
                ChartType::GroupedBar,
                x,
                &columns,
                LabeledTitles::axes(title, x, "Value"),
                policy,
            )
        }
        ChartSpec::Scatter { x, y } => scatter(dataset, x, y, policy),
    }
}

/// Convenience: build the spec from a selection, then adapt
pub fn adapt_selection(
    dataset: &Dataset,
    chart: ChartType,
    x: Option<&str>,
    y: Option<&str>,
    options: &AdapterOptions,
) -> Result<SeriesData> {
    let spec = ChartSpec::from_selection(chart, x, y, options)?;
    adapt(dataset, &spec, options.coercion)
}

struct LabeledTitles {
    title: String,
    x_title: String,
    y_title: String,
}

impl LabeledTitles {
    fn axes(title: String, x: &str, y: &str) -> Self {
        Self {
            title,
            x_title: x.to_string(),
            y_title: y.to_string(),
        }
    }
}

fn labeled(
    dataset: &Dataset,
    chart: ChartType,
    x_col: &str,
    value_columns: &[(String, &str)],
    titles: LabeledTitles,
    policy: CoercionPolicy,
) -> Result<SeriesData> {
    dataset.require_column(x_col)?;
    for (_, col) in value_columns {
        dataset.require_column(col)?;
    }

    let labels = dataset
        .column_cells(x_col)
        .map(|cell| cell.as_text().into_owned())
        .collect();

    let series = value_columns
        .iter()
        .map(|(name, col)| {
            Ok(Series {
                name: name.clone(),
                values: numeric_column(dataset, col, coerce_numeric, policy)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SeriesData::Labeled(LabeledSeries {
        chart,
        title: titles.title,
        x_title: titles.x_title,
        y_title: titles.y_title,
        labels,
        series,
    }))
}

fn scatter(dataset: &Dataset, x_col: &str, y_col: &str, policy: CoercionPolicy) -> Result<SeriesData> {
    dataset.require_column(x_col)?;
    dataset.require_column(y_col)?;

    let xs = numeric_column(dataset, x_col, coerce_strict_numeric, policy)?;
    let ys = numeric_column(dataset, y_col, coerce_strict_numeric, policy)?;
    let points = xs
        .into_iter()
        .zip(ys)
        .map(|(x, y)| ScatterPoint { x, y })
        .collect();

    Ok(SeriesData::Scatter(ScatterSeries {
        x_title: x_col.to_string(),
        y_title: y_col.to_string(),
        points,
    }))
}

fn numeric_column(
    dataset: &Dataset,
    column: &str,
    parse: fn(&str) -> Option<f64>,
    policy: CoercionPolicy,
) -> Result<Vec<Option<f64>>> {
    dataset
        .column_cells(column)
        .enumerate()
        .map(|(index, cell)| {
            let value = coerce_cell(cell, parse);
            if value.is_none() && policy == CoercionPolicy::Strict {
                return Err(ChartError::Coercion {
                    index,
                    column: column.to_string(),
                    value: cell.as_text().into_owned(),
                });
            }
            Ok(value)
        })
        .collect()
}
