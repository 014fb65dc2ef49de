use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CompanionError {
    /// The sentiment service could not be reached or refused the request.
    #[error("mood analysis unavailable, try again ({0})")]
    ClassifierUnavailable(String),

    /// The sentiment service answered with something that is not `LABEL, SCORE`.
    #[error("mood analysis returned an unreadable answer: {0}")]
    MalformedClassification(String),

    #[error("mood log at {path:?} is corrupt: {source}")]
    LogCorrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub(crate) type Result<T> = std::result::Result<T, CompanionError>;
