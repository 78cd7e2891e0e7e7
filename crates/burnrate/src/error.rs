//! CLI error types with exit-code mapping.
//!
//! Failed provider fetches are not errors here — they surface as error
//! rows in the rendered output. This enum covers problems that prevent
//! the command from producing output at all.

use thiserror::Error;

/// Exit codes used by the binary.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Provider '{name}' is not registered. Run: burnrate providers")]
    ProviderNotRegistered { name: String },

    #[error("No cached result for '{name}'. Run: burnrate fetch {name}")]
    NoCachedResult { name: String },

    #[error(transparent)]
    Config(#[from] burnrate_config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            Self::ProviderNotRegistered { .. } | Self::NoCachedResult { .. } => {
                exit_code::NOT_FOUND
            }
            _ => exit_code::GENERAL,
        }
    }
}
