use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid date in manifest: {0}")]
    InvalidDate(String),

    #[error("Duplicate diary entry for {0}")]
    DuplicateDate(NaiveDate),

    /// The scroll container is not mounted yet (or was torn down)
    #[error("Scroll container is not mounted")]
    MissingContainer,

    /// No entries to position, scroll to, or preload
    #[error("Diary has no entries")]
    EmptyDataSet,

    #[error("Failed to load image for {key}: {message}")]
    ImageLoad { key: String, message: String },

    #[error("Preference storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
