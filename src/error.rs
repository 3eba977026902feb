use thiserror::Error;

/// Errors returned by the mood API client and the session layer.
#[derive(Error, Debug)]
pub enum MoodError {
    /// An authenticated call was made without a stored token.
    #[error("Authentication required. Please run 'moodboard login' first.")]
    AuthRequired,

    /// The server rejected the bearer token.
    #[error("Session rejected by server: {0}")]
    Unauthorized(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Only @{domain} accounts are allowed")]
    EmailDomain { domain: String },

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Failed to decode data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised by a media output. The engine downgrades these to warnings.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Playback was rejected: {0}")]
    Rejected(String),

    #[error("Media output failure: {0}")]
    Output(String),

    #[error("Track index {index} out of range (playlist has {len} tracks)")]
    InvalidIndex { index: usize, len: usize },

    #[error("Media output I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Speech recognition failed to start: {0}")]
    Start(String),

    #[error("Speech recognizer I/O error: {0}")]
    Io(#[from] std::io::Error),
}
