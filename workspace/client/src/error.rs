use thiserror::Error;

/// Error types for the backend client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be sent or its body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an unexpected status
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Type alias for Result with ClientError
pub type Result<T> = std::result::Result<T, ClientError>;
