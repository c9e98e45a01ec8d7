// Library exports for chartdrop

pub mod adapter;
pub mod client;
pub mod coerce;
pub mod columns;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod palette;
pub mod render;
pub mod server;
pub mod session;
pub mod store;

pub use adapter::{adapt, ChartSpec, ChartType, SeriesData};
pub use columns::{resolve_columns, ColumnChoice};
pub use data::{load, CellValue, DataFormat, Dataset, Record};
pub use error::ChartError;
pub use session::{RenderOutcome, Session};
