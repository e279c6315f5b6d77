use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum YsError {
    /// An error occurred during an HTTP request (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An error occurred on the DevTools WebSocket connection.
    #[error("WebSocket error: {0}")]
    Websocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// An operation did not complete within its deadline.
    #[error("timed out: {0}")]
    Timeout(String),

    /// No browser backend could be started, or the running one misbehaved.
    #[error("browser driver unavailable: {0}")]
    Driver(String),

    /// The browser reported a failed navigation (DNS, TLS, connection refused).
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// A structured body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The data was in an unexpected shape or a required piece was missing.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// Reading or writing an output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every extraction strategy ran and none produced a row.
    #[error("no extraction strategy produced any rows")]
    ExtractionEmpty,
}

/// Coarse classification of [`YsError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, timeout, non-2xx status or driver problems.
    Transport,
    /// Malformed structured body or embedded state.
    Parse,
    /// Nothing was extracted.
    Empty,
    /// Local filesystem failure.
    Io,
}

impl YsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            YsError::Http(_)
            | YsError::Websocket(_)
            | YsError::Url(_)
            | YsError::Status { .. }
            | YsError::Timeout(_)
            | YsError::Driver(_)
            | YsError::Navigation(_) => ErrorKind::Transport,
            YsError::Json(_) | YsError::Data(_) => ErrorKind::Parse,
            YsError::ExtractionEmpty => ErrorKind::Empty,
            YsError::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_parse(&self) -> bool {
        self.kind() == ErrorKind::Parse
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for YsError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        YsError::Websocket(Box::new(e))
    }
}
