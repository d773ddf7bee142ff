//! Error types for tile coverage processing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using CoverageError.
pub type CoverageResult<T> = Result<T, CoverageError>;

/// Primary error type for coverage rendering and compositing.
#[derive(Debug, Error)]
pub enum CoverageError {
    // === Filesystem Errors ===
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk failed: {0}")]
    Walk(String),

    // === Image Errors ===
    #[error("Image error at {path}: {message}")]
    Image { path: PathBuf, message: String },

    #[error("Basemap unavailable at {path}: {message}")]
    Basemap { path: PathBuf, message: String },

    #[error("Font unavailable at {path}: {message}")]
    Font { path: PathBuf, message: String },

    // === Projection Errors ===
    #[error("Grid row {gy} is outside the projection domain [{min}, {max}]")]
    OutsideProjection { gy: i32, min: i32, max: i32 },

    #[error("Projection error: {0}")]
    Projection(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoverageError {
    /// Wrap an I/O error with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap an image codec error with the path it occurred at.
    pub fn image(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Image {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether this error means a startup resource is missing.
    pub fn is_fatal_resource(&self) -> bool {
        matches!(self, Self::Basemap { .. } | Self::Font { .. })
    }
}

impl From<walkdir::Error> for CoverageError {
    fn from(err: walkdir::Error) -> Self {
        CoverageError::Walk(err.to_string())
    }
}

impl From<serde_yaml::Error> for CoverageError {
    fn from(err: serde_yaml::Error) -> Self {
        CoverageError::Config(format!("YAML error: {}", err))
    }
}
