use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    #[error("Browser initialization failed: {0}")]
    InitFailure(String),

    #[error("Access blocked by the site (unsupported browser / app required page)")]
    BlockedAccess,

    #[error("Unexpected failure: {0}")]
    UnexpectedFailure(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ScrapeError {
    /// What the operator should do next. Nothing here is retried automatically.
    pub fn operator_hint(&self) -> &'static str {
        match self {
            ScrapeError::InitFailure(_) => {
                "This can happen on the first run while the browser is being set up. Run the command again."
            }
            ScrapeError::BlockedAccess => {
                "The site rejected automated access. Inspect the saved page source and try again later."
            }
            ScrapeError::InvalidUrl(_) => "Pass the full playlist link, e.g. https://open.spotify.com/playlist/<id>.",
            ScrapeError::Configuration(_) => "Fix the configuration file and run again.",
            _ => "Check the playlist link or run the command again.",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScrapeError::InvalidUrl(_) => ErrorSeverity::Low,
            ScrapeError::BlockedAccess => ErrorSeverity::Medium,
            ScrapeError::UnexpectedFailure(_) => ErrorSeverity::Medium,
            ScrapeError::InitFailure(_) => ErrorSeverity::High,
            ScrapeError::Configuration(_) => ErrorSeverity::High,
            _ => ErrorSeverity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

impl From<std::io::Error> for ScrapeError {
    fn from(err: std::io::Error) -> Self {
        ScrapeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(err: serde_json::Error) -> Self {
        ScrapeError::Serialization(err.to_string())
    }
}
