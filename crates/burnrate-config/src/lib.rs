//! Shared configuration for the burnrate CLI and TUI.
//!
//! TOML config file, token resolution (env vars + CLI credential files +
//! plaintext), and construction of the provider set both binaries poll.

use std::collections::HashMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use burnrate_api::TransportConfig;
use burnrate_api::credentials::{ClaudeCliCredentials, CodexAuthFile};
use burnrate_core::cache::CacheConfig;
use burnrate_core::{ClaudeProvider, CodexProvider, OpenAiProvider, Provider, ProviderId};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Cache tuning overrides.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Per-provider settings, keyed by provider id ("claude", "openai",
    /// "copilot", "codex").
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_window")]
    pub window: String,

    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// TUI auto-refresh interval.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// HTTP request timeout.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            window: default_window(),
            output: default_output(),
            color: default_color(),
            poll_interval_secs: default_poll_interval(),
            timeout: default_timeout(),
        }
    }
}

fn default_window() -> String {
    "7d".into()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_poll_interval() -> u64 {
    60
}
fn default_timeout() -> u64 {
    30
}

/// Cache overrides. Anything left unset falls back to the built-in
/// per-provider TTL table.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Cache directory override (`BURNRATE_CACHE_DIR` wins over this).
    pub dir: Option<PathBuf>,

    /// Default TTL for providers without an override.
    pub default_ttl_secs: Option<u64>,

    /// Per-provider TTL overrides, keyed by provider id.
    #[serde(default)]
    pub ttl_secs: HashMap<String, u64>,
}

impl CacheSettings {
    /// Merge these overrides onto the built-in cache defaults.
    pub fn to_cache_config(&self) -> CacheConfig {
        let mut config = CacheConfig::default();
        if std::env::var_os("BURNRATE_CACHE_DIR").is_none() {
            if let Some(ref dir) = self.dir {
                config.dir.clone_from(dir);
            }
        }
        if let Some(ttl) = self.default_ttl_secs {
            config.default_ttl_secs = ttl;
        }
        for (name, ttl) in &self.ttl_secs {
            if let Ok(provider) = name.parse::<ProviderId>() {
                config.ttl_secs.insert(provider, *ttl);
            }
        }
        config
    }
}

/// Per-provider settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct ProviderSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Token in plaintext (prefer env vars).
    pub token: Option<String>,

    /// Environment variable to read the token from, checked before the
    /// provider's built-in variable.
    pub token_env: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            token: None,
            token_env: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "burnrate", "burnrate").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("burnrate");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("BURNRATE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning defaults if the file doesn't exist or parse.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Built-in environment variable per provider.
pub fn token_env_var(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::Claude => "CLAUDE_CODE_OAUTH_TOKEN",
        ProviderId::OpenAi => "OPENAI_ADMIN_KEY",
        ProviderId::Copilot => "GITHUB_TOKEN",
        ProviderId::Codex => "CODEX_ACCESS_TOKEN",
    }
}

/// Resolve a provider's token through the credential chain:
///
/// 1. the `token_env` variable named in config
/// 2. the provider's built-in environment variable
/// 3. the credential file maintained by the vendor's own CLI
/// 4. plaintext `token` in config
pub fn resolve_token(config: &Config, provider: ProviderId) -> Option<SecretString> {
    let settings = config.providers.get(&provider.to_string());

    if let Some(env_name) = settings.and_then(|s| s.token_env.as_deref()) {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Some(SecretString::from(val));
            }
        }
    }

    if let Ok(val) = std::env::var(token_env_var(provider)) {
        if !val.is_empty() {
            return Some(SecretString::from(val));
        }
    }

    match provider {
        ProviderId::Claude => {
            if let Some(token) = ClaudeCliCredentials::new().access_token() {
                return Some(token);
            }
        }
        ProviderId::Codex => {
            if let Some(creds) = CodexAuthFile::new().load() {
                return Some(creds.access_token);
            }
        }
        ProviderId::OpenAi | ProviderId::Copilot => {}
    }

    settings
        .and_then(|s| s.token.clone())
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
}

/// Whether a token looks plausible for the provider, judged by prefix.
pub fn token_prefix_ok(provider: ProviderId, token: &str) -> bool {
    match provider {
        ProviderId::Claude => token.starts_with("sk-ant-"),
        ProviderId::OpenAi => token.starts_with("sk-"),
        ProviderId::Copilot => token.starts_with("ghp_") || token.starts_with("github_pat_"),
        ProviderId::Codex => true,
    }
}

/// Safe preview of a token for status output: first 8 and last 4
/// characters. Short tokens get no preview at all.
pub fn token_preview(token: &SecretString) -> Option<String> {
    let t = token.expose_secret();
    let count = t.chars().count();
    if count < 12 {
        return None;
    }
    let head: String = t.chars().take(8).collect();
    let tail: String = t.chars().skip(count - 4).collect();
    Some(format!("{head}...{tail}"))
}

// ── Provider status ─────────────────────────────────────────────────

/// Static facts plus resolved credential state for one provider.
#[derive(Debug, Clone)]
pub struct ProviderStatusReport {
    pub provider: ProviderId,
    pub name: &'static str,
    pub description: &'static str,
    pub official: bool,
    pub note: &'static str,
    pub env_var: &'static str,
    pub enabled: bool,
    pub configured: bool,
    pub token_preview: Option<String>,
}

fn provider_info(provider: ProviderId) -> (&'static str, bool, &'static str) {
    match provider {
        ProviderId::Claude => (
            "Claude Code subscription quota via OAuth",
            false,
            "Uses unofficial OAuth endpoint with beta header",
        ),
        ProviderId::OpenAi => (
            "OpenAI API usage and costs",
            true,
            "Requires organization admin API key",
        ),
        ProviderId::Copilot => (
            "GitHub Copilot quota via internal API",
            false,
            "No adapter implemented yet",
        ),
        ProviderId::Codex => (
            "OpenAI Codex usage via ChatGPT backend",
            false,
            "Reads credentials from ~/.codex/auth.json",
        ),
    }
}

fn provider_enabled(config: &Config, provider: ProviderId) -> bool {
    config
        .providers
        .get(&provider.to_string())
        .is_none_or(|s| s.enabled)
}

/// Resolved status for one provider.
pub fn provider_status(config: &Config, provider: ProviderId) -> ProviderStatusReport {
    let (description, official, note) = provider_info(provider);
    let token = resolve_token(config, provider);
    let configured = token
        .as_ref()
        .is_some_and(|t| token_prefix_ok(provider, t.expose_secret()));

    ProviderStatusReport {
        provider,
        name: provider.display_name(),
        description,
        official,
        note,
        env_var: token_env_var(provider),
        enabled: provider_enabled(config, provider),
        configured,
        token_preview: if configured {
            token.as_ref().and_then(token_preview)
        } else {
            None
        },
    }
}

/// Status for every known provider, in enumeration order.
pub fn all_provider_status(config: &Config) -> Vec<ProviderStatusReport> {
    use strum::IntoEnumIterator;
    ProviderId::iter()
        .map(|p| provider_status(config, p))
        .collect()
}

// ── Provider construction ───────────────────────────────────────────

/// Build the provider set both binaries poll, in display order. Disabled
/// providers are skipped; providers without credentials are still
/// registered so their "not configured" state shows up in output.
/// Copilot has no adapter and is never registered.
pub fn build_providers(config: &Config) -> Vec<Box<dyn Provider>> {
    let transport = TransportConfig {
        timeout: std::time::Duration::from_secs(config.defaults.timeout),
    };

    let mut providers: Vec<Box<dyn Provider>> = Vec::new();

    if provider_enabled(config, ProviderId::Claude) {
        providers.push(Box::new(ClaudeProvider::new(
            resolve_token(config, ProviderId::Claude),
            &transport,
        )));
    }

    if provider_enabled(config, ProviderId::OpenAi) {
        providers.push(Box::new(OpenAiProvider::new(
            resolve_token(config, ProviderId::OpenAi),
            &transport,
        )));
    }

    if provider_enabled(config, ProviderId::Codex) {
        // Env var token wins; otherwise the CLI auth file also carries the
        // account id header.
        let env_token = std::env::var(token_env_var(ProviderId::Codex))
            .ok()
            .filter(|t| !t.is_empty());
        let provider = match env_token {
            Some(token) => CodexProvider::new(Some(SecretString::from(token)), None, &transport),
            None => CodexProvider::from_cli_auth(&transport),
        };
        providers.push(Box::new(provider));
    }

    if provider_enabled(config, ProviderId::Copilot) {
        debug!("copilot enabled but has no adapter; skipping");
    }

    providers
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.defaults.window, "7d");
        assert_eq!(config.defaults.output, "table");
        assert_eq!(config.defaults.poll_interval_secs, 60);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn parses_provider_table() {
        let config: Config = toml::from_str(
            r#"
            [defaults]
            window = "30d"

            [providers.openai]
            token_env = "MY_OPENAI_KEY"

            [providers.copilot]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.defaults.window, "30d");
        assert_eq!(
            config.providers["openai"].token_env.as_deref(),
            Some("MY_OPENAI_KEY")
        );
        assert!(!config.providers["copilot"].enabled);
        assert!(!provider_enabled(&config, ProviderId::Copilot));
        assert!(provider_enabled(&config, ProviderId::Claude));
    }

    #[test]
    fn cache_settings_merge_onto_defaults() {
        let config: Config = toml::from_str(
            r#"
            [cache]
            default_ttl_secs = 45

            [cache.ttl_secs]
            claude = 15
            "#,
        )
        .unwrap();

        let cache = config.cache.to_cache_config();
        assert_eq!(cache.default_ttl_secs, 45);
        assert_eq!(cache.ttl_for(ProviderId::Claude), 15);
        // Untouched overrides keep their built-in values.
        assert_eq!(cache.ttl_for(ProviderId::OpenAi), 180);
    }

    #[test]
    fn token_prefix_validation() {
        assert!(token_prefix_ok(ProviderId::Claude, "sk-ant-oat01-x"));
        assert!(!token_prefix_ok(ProviderId::Claude, "sk-proj-x"));
        assert!(token_prefix_ok(ProviderId::OpenAi, "sk-admin-x"));
        assert!(!token_prefix_ok(ProviderId::OpenAi, "pk-x"));
        assert!(token_prefix_ok(ProviderId::Copilot, "github_pat_abc"));
        assert!(token_prefix_ok(ProviderId::Codex, "eyJ-anything"));
    }

    #[test]
    fn token_preview_hides_short_tokens() {
        assert_eq!(
            token_preview(&SecretString::from("sk-ant-oat01-abcdef")).as_deref(),
            Some("sk-ant-o...cdef")
        );
        assert!(token_preview(&SecretString::from("short")).is_none());
    }

    #[test]
    fn token_preview_counts_characters_not_bytes() {
        // Multi-byte characters around both boundaries must not split.
        assert_eq!(
            token_preview(&SecretString::from("sk-ant-öat01-abcdéf")).as_deref(),
            Some("sk-ant-ö...cdéf")
        );
        // 11 characters but more than 12 bytes: still too short.
        assert!(token_preview(&SecretString::from("ööööööööööö")).is_none());
    }

    #[test]
    fn plaintext_token_resolves_last() {
        let mut config = Config::default();
        config.providers.insert(
            "openai".into(),
            ProviderSettings {
                token: Some("sk-from-config".into()),
                ..ProviderSettings::default()
            },
        );

        // No env vars set for this provider in the test environment.
        let token = resolve_token(&config, ProviderId::OpenAi).unwrap();
        assert_eq!(token.expose_secret(), "sk-from-config");
    }
}
