use thiserror::Error;

use crate::dataset::DatasetKind;

/// Error type for loading, normalizing and rendering activity data.
///
/// Every variant is recoverable: the caller reports the message and keeps
/// whatever dataset it was already showing.
#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("missing required column: {}", .synonyms.join(" or "))]
    MissingColumn {
        field: &'static str,
        synonyms: &'static [&'static str],
    },
    #[error("no valid data found in the CSV file")]
    EmptyResult,
    #[error("error reading '{source_name}': {reason}")]
    FileRead { source_name: String, reason: String },
    #[error("cannot render an empty dataset")]
    NoRecords,
    #[error("drawing surface must have a non-zero size, got {width}x{height}")]
    InvalidSurface { width: f64, height: f64 },
    #[error("the {0} dataset has not been loaded")]
    DatasetNotLoaded(DatasetKind),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl HeatmapError {
    pub(crate) fn file_read(source_name: &str, reason: impl ToString) -> Self {
        HeatmapError::FileRead {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }
}
