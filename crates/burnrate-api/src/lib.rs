//! `burnrate-api` — async HTTP clients for AI vendor usage/quota APIs.
//!
//! One hand-crafted client per vendor surface: the Claude Code OAuth usage
//! endpoint, the official OpenAI organization admin API, and the ChatGPT
//! backend endpoint the Codex CLI talks to. Each client returns a typed
//! payload together with the untouched JSON body, so consumers can both
//! normalize the data and keep the raw response for diagnostics.
//!
//! `burnrate-core` maps these clients into the normalized result model —
//! nothing in this crate knows about caching or display.

pub mod claude;
pub mod codex;
pub mod credentials;
pub mod error;
pub mod openai;
pub mod transport;

pub use claude::{ClaudeQuotaWindow, ClaudeUsage, ClaudeUsageClient, ClaudeUsageResponse};
pub use codex::{CodexClient, CodexRateWindow, CodexUsage, CodexUsageResponse};
pub use credentials::{ClaudeCliCredentials, CodexAuthFile, CodexCredentials};
pub use error::Error;
pub use openai::{AdminResponse, CompletionsResult, CostResult, OpenAiAdminClient};
pub use transport::TransportConfig;
