use thiserror::Error;

use crate::sequencer::{Action, Page};

/// Navigation request the current page cannot honor. State is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("no earlier task to go back to")]
    NoEarlierTask,

    #[error("{action} is not available on the {page} screen")]
    Unavailable { action: Action, page: Page },
}

/// Selection that does not map onto the palette
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown color index {0}")]
    UnknownColor(u8),

    #[error("unknown pattern index {0}")]
    UnknownPattern(u8),
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("no form fields configured for label '{0}'")]
    MissingFields(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint rejected submission with status {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid endpoint URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("archive write failed: {0}")]
    Archive(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected} task labels, found {found}")]
    LabelCount { expected: usize, found: usize },

    #[error("no form fields configured for label '{0}'")]
    MissingFields(String),
}
