//! Core domain logic for burnrate: the normalized usage model shared by
//! every surface, the tiered result cache that decides when vendors are
//! actually polled, and the monitor that coordinates the two.
//!
//! Raw HTTP lives in `burnrate-api`; this crate turns vendor payloads
//! into [`ProviderResult`]s and keeps them fresh.

pub mod cache;
pub mod error;
pub mod model;
pub mod monitor;
pub mod provider;
pub mod providers;

pub use cache::{CacheConfig, CacheEntry, ResultCache};
pub use error::CoreError;
pub use model::{ProviderId, ProviderResult, UsageMetrics, Window};
pub use monitor::{Monitor, ProviderStatus};
pub use provider::Provider;
pub use providers::{ClaudeProvider, CodexProvider, OpenAiProvider};
