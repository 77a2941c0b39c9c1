//! Common error types used throughout trimline.
//!
//! Malformed spans are never errors: the normalizer clamps or drops them. What
//! remains are local precondition failures, failures talking to the external
//! render and suggestion services, and bad user input at the CLI boundary.

/// Common error type for trimline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A local precondition was not met; no request was issued.
    #[error("{0}")]
    Precondition(String),

    /// The request could not be sent or the response could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status.
    #[error("Service error [{status}]: {message}")]
    Service {
        /// HTTP status code returned by the service.
        status: u16,
        /// Body or reason returned with the status.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The media handle refused to start playback.
    #[error("Playback error: {0}")]
    Playback(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new Precondition error.
    pub fn precondition<S: Into<String>>(msg: S) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a new Transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new Service error.
    pub fn service<S: Into<String>>(status: u16, msg: S) -> Self {
        Self::Service {
            status,
            message: msg.into(),
        }
    }

    /// Create a new Decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True for failures at the service boundary (transport, status, decode).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Service { .. } | Self::Decode(_)
        )
    }

    /// Message suitable for showing to the person editing.
    pub fn user_message(&self) -> String {
        match self {
            Self::Precondition(msg) => msg.clone(),
            Self::Transport(_) => "Could not reach the service. Check your connection and try again.".into(),
            Self::Service { status, message } if message.is_empty() => {
                format!("The service rejected the request (status {status}).")
            }
            Self::Service { message, .. } => message.clone(),
            Self::Decode(_) => "The service returned an unexpected response.".into(),
            other => other.to_string(),
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
