use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecourtError {
    #[error("Selection error: {0}")]
    Selection(#[from] crate::amenity::SelectionError),
    #[error("Sort error: {0}")]
    Sort(#[from] crate::sort::SortError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ForecourtError>;
