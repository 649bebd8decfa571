use thiserror::Error;

/// Spotify client errors
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify rate limit exceeded (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("Spotify rejected the access token")]
    Unauthorized,

    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not logged in to Spotify")]
    NotAuthenticated,

    #[error("Unknown or expired OAuth state")]
    InvalidState,

    #[error("Token storage error: {0}")]
    Storage(#[from] relaylist_common::Error),
}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SpotifyError::Parse(err.to_string())
        } else {
            SpotifyError::Network(err.to_string())
        }
    }
}
