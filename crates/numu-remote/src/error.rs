use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote backend is not configured")]
    Offline,

    #[error("remote returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("remote transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected remote payload: {0}")]
    Decode(#[from] serde_json::Error),
}
