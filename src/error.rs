use std::path::PathBuf;

use thiserror::Error;

/// Every way a conversion run can stop.
///
/// Skipped resources and skipped note files are not errors; they are
/// reported through `Extraction::skipped_resources` and
/// `ExportSummary::skipped_notes` instead.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("File does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Could not parse XML: {0}")]
    Xml(String),

    #[error("Note #{index} has no title element")]
    MissingTitle { index: usize },

    #[error("Resource in note {title:?} has no mime element")]
    MissingResourceMime { title: String },

    #[error("Failed exporting resource in {title:?} with mime {mime}")]
    MissingResourceData { title: String, mime: String },

    #[error("Invalid {field} date {value:?} in note {title:?}")]
    InvalidDate {
        title: String,
        field: &'static str,
        value: String,
    },

    #[error("\"{}\" exists but is not a directory", .0.display())]
    DestinationNotDirectory(PathBuf),

    #[error("Refusing to overwrite existing file {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Invalid base64 data in resource {filename:?}: {source}")]
    InvalidResourceData {
        filename: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for ConvertError {
    fn from(err: toml::de::Error) -> Self {
        ConvertError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
