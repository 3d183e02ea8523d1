use std::path::PathBuf;
use thiserror::Error;

use crate::prepare::PrepareReport;

/// The main error type for cctv-prep operations.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Invalid split ratios: train={train}, val={val} \
         (each must be in (0, 1) and train + val must be < 1)"
    )]
    InvalidRatio { train: f64, val: f64 },

    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    #[error(
        "Unknown DORI level '{0}' (expected detection, observation, recognition or identification)"
    )]
    UnknownDoriLevel(String),

    #[error("Source directory not found: {path}")]
    SourceDirMissing { path: PathBuf },

    #[error("No valid image-label pairs in {images_dir} ({missing_labels} image(s) without a label)")]
    NoValidPairs {
        images_dir: PathBuf,
        missing_labels: usize,
    },

    #[error("Dataset materialization finished with {failed} failed file operation(s)")]
    MaterializeFailed {
        failed: usize,
        report: Box<PrepareReport>,
    },

    #[error("Failed to convert {path}: {message}")]
    ConversionFailed { path: PathBuf, message: String },

    #[error("Failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write data.yaml to {path}: {source}")]
    DataYamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse camera CSV from {path}: {source}")]
    CameraCsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to serialize report as JSON: {0}")]
    ReportJson(#[from] serde_json::Error),

    #[error("Missing input: {0}")]
    MissingInput(String),
}
