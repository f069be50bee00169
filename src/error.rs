use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cocoslice operations.
///
/// Only fatal conditions live here. Recoverable problems (a missing split,
/// an annotation pointing at an unknown image) are recorded in the
/// extraction report and processing continues.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize annotations for {path}: {source}")]
    LabelJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    DataYamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyImage {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list image directory {path}: {message}")]
    ImageDirList { path: PathBuf, message: String },

    #[error("Invalid YOLO label in {path} at line {line}: {message}")]
    YoloLabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[source] serde_json::Error),
}
