use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("Invalid QR endpoint URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("Clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
