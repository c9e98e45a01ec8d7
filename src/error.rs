// Error taxonomy for the upload -> parse -> adapt -> render pipeline

use crate::data::DataFormat;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    /// Upload or fetch failed at the HTTP layer (connection failure, non-2xx status).
    #[error("transport error: {0}")]
    Transport(String),

    /// Declared mimetype is neither CSV nor JSON.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Content could not be parsed per its declared format.
    #[error("failed to parse {format} content: {message}")]
    Parse { format: DataFormat, message: String },

    /// X or Y column not chosen.
    #[error("X or Y column not selected")]
    MissingSelection,

    #[error("column '{column}' not found. Available columns: {available}")]
    UnknownColumn { column: String, available: String },

    /// Raised only under the strict coercion policy.
    #[error("record {index}: value {value:?} in column '{column}' is not numeric")]
    Coercion {
        index: usize,
        column: String,
        value: String,
    },

    #[error("failed to render chart: {0:#}")]
    Render(anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChartError {
    pub(crate) fn unknown_column(column: &str, available: &[String]) -> Self {
        ChartError::UnknownColumn {
            column: column.to_string(),
            available: available.join(", "),
        }
    }
}

impl From<reqwest::Error> for ChartError {
    fn from(err: reqwest::Error) -> Self {
        ChartError::Transport(err.to_string())
    }
}
