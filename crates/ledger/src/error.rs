use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered 2xx but flagged an application-level error.
    #[error("wallet service error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("unexpected response shape: {0}")]
    Shape(String),
    #[error("login failed: {0}")]
    Login(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache error: {0}")]
    Cache(#[from] serde_json::Error),
}
