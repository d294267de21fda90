use std::path::PathBuf;

use thiserror::Error;

/// Why an upload could not be turned into a table.
///
/// Every variant leaves the application without a table; the UI asks the
/// user for a valid file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("the uploaded file is empty")]
    Empty,

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("the spreadsheet has no header row")]
    MissingHeader,

    #[error(transparent)]
    Malformed(#[from] anyhow::Error),
}

/// Failures loading an optional asset such as the stylesheet.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("invalid asset {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
