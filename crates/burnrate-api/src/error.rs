use thiserror::Error;

/// Top-level error type for the `burnrate-api` crate.
///
/// Covers every failure mode across the vendor endpoints: authentication,
/// transport, rate limiting, and payload decoding. `burnrate-core` maps
/// these into normalized error results — consumers never see raw HTTP
/// details.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token rejected (expired, revoked, or wrong kind of key).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Token accepted but lacks the required permission or scope.
    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    // ── Vendor responses ────────────────────────────────────────────
    /// Rate limited by the vendor API.
    #[error("Rate limited -- try again later")]
    RateLimited,

    /// Non-success HTTP status with whatever body the vendor returned.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the token is bad and
    /// re-authentication might resolve it.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Forbidden { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}
