// Command-line and rendering configuration

use crate::adapter::ChartType;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Series plotted by the grouped bar chart unless overridden
pub const DEFAULT_GROUP_COLUMNS: [&str; 2] = ["Inpatient Physician", "Outpatient Physician"];

#[derive(Parser, Debug)]
#[command(name = "chartdrop")]
#[command(about = "Upload CSV/JSON datasets and render bar, line, scatter, pie or grouped bar charts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the upload server
    Serve(ServeArgs),
    /// Load a dataset (optionally through a running server) and render a chart
    Plot(PlotArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Directory uploads are written to and served from
    #[arg(long = "upload-dir", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Multipart form field holding the file
    #[arg(long, default_value = "dataFile")]
    pub field: String,

    /// Directory served at `/` (index.html as index)
    #[arg(long = "static-dir")]
    pub static_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PlotArgs {
    /// CSV or JSON dataset
    pub file: PathBuf,

    /// Upload through this server (e.g. http://127.0.0.1:3000) instead of reading locally
    #[arg(long)]
    pub server: Option<String>,

    /// Multipart form field used for the upload
    #[arg(long, default_value = "dataFile")]
    pub field: String,

    #[arg(long, value_enum, default_value_t = ChartType::Bar)]
    pub chart: ChartType,

    /// X-axis column (defaults to the first column)
    #[arg(short = 'x', long = "x")]
    pub x_column: Option<String>,

    /// Y-axis column (defaults to the second column)
    #[arg(short = 'y', long = "y")]
    pub y_column: Option<String>,

    /// Series columns for the grouped bar chart (repeatable)
    #[arg(long = "series")]
    pub series: Vec<String>,

    /// Fail on non-numeric cells instead of leaving gaps
    #[arg(long)]
    pub strict: bool,

    #[arg(long, default_value_t = 800)]
    pub width: u32,

    #[arg(long, default_value_t = 600)]
    pub height: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// Output file (stdout when omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Print the available columns and defaults instead of rendering
    #[arg(long)]
    pub columns: bool,
}

impl PlotArgs {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    pub fn adapter_options(&self) -> AdapterOptions {
        let mut options = AdapterOptions::default();
        if !self.series.is_empty() {
            options.group_columns = self.series.clone();
        }
        if self.strict {
            options.coercion = CoercionPolicy::Strict;
        }
        options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Png,
        }
    }
}

/// What to do with a cell that fails numeric coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionPolicy {
    /// Substitute a missing value and keep going
    #[default]
    Sentinel,
    /// Abort with `ChartError::Coercion`
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdapterOptions {
    pub group_columns: Vec<String>,
    pub coercion: CoercionPolicy,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            group_columns: DEFAULT_GROUP_COLUMNS.iter().map(|s| s.to_string()).collect(),
            coercion: CoercionPolicy::Sentinel,
        }
    }
}
