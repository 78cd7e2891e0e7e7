// ── Core error types ──
//
// User-facing errors from burnrate-core. Ordinary fetch failures (auth,
// rate limiting, network) never appear here -- they are represented as
// error results in the normalized model. This enum covers construction
// and configuration problems only.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Failure building an API client (bad URL, TLS setup, etc.)
    #[error("API client error: {0}")]
    Api(#[from] burnrate_api::Error),
}
