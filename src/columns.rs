// Column discovery and default axis selection

use crate::data::Dataset;
use serde::Serialize;

/// Columns a user may pick from, plus the preselected axes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnChoice {
    pub available: Vec<String>,
    pub default_x: Option<String>,
    pub default_y: Option<String>,
}

/// Inspect the dataset's first record and pick default x/y columns.
///
/// With two or more columns the first two are used. A single column is used for
/// both axes. An empty dataset offers nothing.
pub fn resolve_columns(dataset: &Dataset) -> ColumnChoice {
    let available = dataset.columns().to_vec();

    let (default_x, default_y) = match available.as_slice() {
        [] => (None, None),
        [only] => (Some(only.clone()), Some(only.clone())),
        [first, second, ..] => (Some(first.clone()), Some(second.clone())),
    };

    ColumnChoice {
        available,
        default_x,
        default_y,
    }
}
