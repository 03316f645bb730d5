use thiserror::Error;

/// Failures of one clip operation. Line-level decode problems never show up
/// here; they are counted and dropped by the SSE reader.
#[derive(Debug, Error)]
pub enum ClipError {
    /// Rejected locally, no request was sent.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The endpoint answered with a non-2xx status.
    #[error("API request failed ({status}): {body}")]
    Transport { status: u16, body: String },

    #[error("Failed to send request to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    /// The connection dropped or the body could not be read mid-stream.
    #[error("Failed to read response stream: {0}")]
    StreamRead(String),
}

impl ClipError {
    pub fn config(message: impl Into<String>) -> Self {
        ClipError::Config(message.into())
    }
}

pub type ClipResult<T> = std::result::Result<T, ClipError>;
