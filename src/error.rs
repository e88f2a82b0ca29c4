use std::path::PathBuf;

use thiserror::Error;

/// Failure to parse a `{surface}-{row}-{col}` cell id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellIdError {
    #[error("cell id {0:?} is not of the form surface-row-col")]
    Malformed(String),

    #[error("unknown surface {0:?}")]
    UnknownSurface(String),

    #[error("cell id {0:?} has a zero row or column (ids are 1-indexed)")]
    ZeroIndex(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rotation must be 0, 90, 180 or 270 degrees, got {0}")]
pub struct RotationError(pub u16);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("grid divisions must be between 1 and 256, got {0}")]
    InvalidDivisions(u32),

    #[error("corner of {surface} is outside the image ({x}, {y}); fractions must be within 0..=1")]
    CornerOutOfRange { surface: String, x: f32, y: f32 },

    #[error("catalog item {0:?} is listed more than once")]
    DuplicateCatalogItem(String),

    #[error("catalog item {item_id:?} needs dimensions between 1 and 256, got {x_length}x{y_length}")]
    EmptyCatalogItem {
        item_id: String,
        x_length: u32,
        y_length: u32,
    },
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to read gesture file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
