use synclyrics_core::CoreError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised while talking to the lyrics server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connecting, reading or the handshake failed.
    #[error("WebSocket error: {0}")]
    WebSocket(#[source] Box<tungstenite::Error>),

    /// Error from the core, e.g. the engine has stopped.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<tungstenite::Error> for ClientError {
    fn from(error: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(error))
    }
}

/// Convenience type alias for Results with `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
