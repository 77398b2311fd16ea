use thiserror::Error;

use crate::display::RenderError;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown renderer: {0}")]
    UnknownRenderer(String),

    #[error("Response {id} failed: {message}")]
    ResponseFailed { id: String, message: String },
}

impl ClientError {
    /// Extra guidance for the user, when the error has any.
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Transport(e) => e.hint(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::UnknownRenderer("html".to_string());
        assert_eq!(err.to_string(), "Unknown renderer: html");
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err: ClientError = TransportError::Stream("connection closed mid-event".into()).into();
        assert_eq!(err.to_string(), "Stream error: connection closed mid-event");
    }

    #[test]
    fn test_hint_passes_through() {
        let err: ClientError = TransportError::auth_with_hint("bad key", "Check OPENAI_API_KEY").into();
        assert_eq!(err.hint(), Some("Check OPENAI_API_KEY"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ClientError = io_err.into();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
