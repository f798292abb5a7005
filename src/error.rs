//! Error types for the card generator

use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or exporting a card
///
/// Editing form fields and rendering the preview never fail. `MissingRoot`,
/// `Rasterization` and `Delivery` are raised on the export path and logged
/// there; `Exporter::trigger` never returns them.
#[derive(Error, Debug)]
pub enum Error {
    /// Export was requested before any preview was mounted
    #[error("No rendered root is mounted")]
    MissingRoot,

    /// The rasterizer rejected the rendered root
    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    /// PNG or data URI encoding/decoding failed
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// The downloader could not deliver the file
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Invalid configuration or unknown theme/aspect id
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
