//! Readers for credentials that other CLIs have already obtained.
//!
//! Neither the Claude nor the Codex OAuth flow is documented for
//! third-party applications, so instead of implementing login we read the
//! credential files the official CLIs maintain on disk. Missing or
//! malformed files are simply "no credentials" — never an error.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

// ── Claude CLI (~/.claude/.credentials.json) ─────────────────────────

#[derive(Debug, Deserialize)]
struct ClaudeCredentialFile {
    #[serde(rename = "claudeAiOauth")]
    claude_ai_oauth: Option<ClaudeOauthSection>,
}

/// The `claudeAiOauth` section of the Claude CLI credential file.
#[derive(Debug, Deserialize)]
pub struct ClaudeOauthSection {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
    /// Expiry as a unix timestamp in milliseconds.
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<i64>,
}

impl ClaudeOauthSection {
    /// Whether the stored token has passed its expiry time. Missing expiry
    /// counts as expired.
    pub fn is_expired(&self) -> bool {
        match self.expires_at.and_then(DateTime::from_timestamp_millis) {
            Some(expires_at) => Utc::now() >= expires_at,
            None => true,
        }
    }
}

/// Reader for the Claude CLI credential file.
pub struct ClaudeCliCredentials {
    path: PathBuf,
}

impl ClaudeCliCredentials {
    /// Reader for the default location, `~/.claude/.credentials.json`.
    pub fn new() -> Self {
        let path = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".claude").join(".credentials.json"))
            .unwrap_or_else(|| PathBuf::from(".claude/.credentials.json"));
        Self { path }
    }

    /// Reader for an explicit file path (used in tests).
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the OAuth section, if the file exists and parses.
    pub fn load(&self) -> Option<ClaudeOauthSection> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let file: ClaudeCredentialFile = serde_json::from_str(&text).ok()?;
        file.claude_ai_oauth
    }

    /// The current access token, if one is stored and still valid. An
    /// expired token would only earn a 401, so it is treated as absent.
    pub fn access_token(&self) -> Option<SecretString> {
        let section = self.load()?;
        if section.is_expired() {
            debug!(path = %self.path.display(), "claude cli token is expired");
            return None;
        }
        let token = section.access_token.filter(|t| !t.is_empty())?;
        debug!(path = %self.path.display(), "loaded claude cli token");
        Some(SecretString::from(token))
    }
}

impl Default for ClaudeCliCredentials {
    fn default() -> Self {
        Self::new()
    }
}

// ── Codex CLI ($CODEX_HOME/auth.json) ────────────────────────────────

/// Credentials extracted from the Codex CLI auth file.
#[derive(Debug, Clone)]
pub struct CodexCredentials {
    pub access_token: SecretString,
    pub account_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CodexAuthJson {
    /// Nested format written by current Codex CLI versions.
    tokens: Option<CodexTokens>,
    /// Flat fallback used by older versions.
    access_token: Option<String>,
    account_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CodexTokens {
    access_token: Option<String>,
    account_id: Option<String>,
}

/// Reader for the Codex CLI auth file.
pub struct CodexAuthFile {
    home: PathBuf,
}

impl CodexAuthFile {
    /// Reader for the default home, `$CODEX_HOME` or `~/.codex`.
    pub fn new() -> Self {
        let home = std::env::var_os("CODEX_HOME").map_or_else(
            || {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".codex"))
                    .unwrap_or_else(|| PathBuf::from(".codex"))
            },
            PathBuf::from,
        );
        Self { home }
    }

    /// Reader rooted at an explicit Codex home directory (used in tests).
    pub fn at_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    fn auth_path(&self) -> PathBuf {
        self.home.join("auth.json")
    }

    /// Load credentials, preferring the nested `tokens` format.
    pub fn load(&self) -> Option<CodexCredentials> {
        let parsed = read_auth_json(&self.auth_path())?;

        let (token, account_id) = match parsed.tokens {
            Some(tokens) => (tokens.access_token, tokens.account_id),
            None => (parsed.access_token, parsed.account_id),
        };

        let token = token.filter(|t| !t.is_empty())?;
        debug!(path = %self.auth_path().display(), "loaded codex cli token");
        Some(CodexCredentials {
            access_token: SecretString::from(token),
            account_id,
        })
    }
}

impl Default for CodexAuthFile {
    fn default() -> Self {
        Self::new()
    }
}

fn read_auth_json(path: &Path) -> Option<CodexAuthJson> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn claude_reads_access_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".credentials.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "claudeAiOauth": {
                    "accessToken": "sk-ant-oat01-abc",
                    "expiresAt": 4_102_444_800_000_i64,
                    "subscriptionType": "max"
                }
            })
            .to_string(),
        )
        .unwrap();

        let creds = ClaudeCliCredentials::at_path(&path);
        let token = creds.access_token().unwrap();
        assert_eq!(token.expose_secret(), "sk-ant-oat01-abc");
        assert!(!creds.load().unwrap().is_expired());
    }

    #[test]
    fn claude_expired_token_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".credentials.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "claudeAiOauth": {
                    "accessToken": "sk-ant-oat01-old",
                    "expiresAt": 1_000_000_000_000_i64
                }
            })
            .to_string(),
        )
        .unwrap();

        let creds = ClaudeCliCredentials::at_path(&path);
        // The section still loads, but the token is withheld.
        assert!(creds.load().unwrap().is_expired());
        assert!(creds.access_token().is_none());
    }

    #[test]
    fn claude_missing_expiry_counts_as_expired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".credentials.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "claudeAiOauth": { "accessToken": "sk-ant-oat01-noexp" }
            })
            .to_string(),
        )
        .unwrap();

        assert!(ClaudeCliCredentials::at_path(&path).access_token().is_none());
    }

    #[test]
    fn claude_missing_file_is_none() {
        let creds = ClaudeCliCredentials::at_path("/nonexistent/.credentials.json");
        assert!(creds.access_token().is_none());
    }

    #[test]
    fn claude_garbage_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".credentials.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(ClaudeCliCredentials::at_path(&path).access_token().is_none());
    }

    #[test]
    fn codex_prefers_nested_tokens() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("auth.json"),
            serde_json::json!({
                "OPENAI_API_KEY": null,
                "tokens": {
                    "access_token": "eyJ-nested",
                    "refresh_token": "r",
                    "account_id": "acct-1"
                },
                "last_refresh": "2026-01-01T00:00:00Z"
            })
            .to_string(),
        )
        .unwrap();

        let creds = CodexAuthFile::at_home(dir.path()).load().unwrap();
        assert_eq!(creds.access_token.expose_secret(), "eyJ-nested");
        assert_eq!(creds.account_id.as_deref(), Some("acct-1"));
    }

    #[test]
    fn codex_flat_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("auth.json"),
            serde_json::json!({ "access_token": "eyJ-flat" }).to_string(),
        )
        .unwrap();

        let creds = CodexAuthFile::at_home(dir.path()).load().unwrap();
        assert_eq!(creds.access_token.expose_secret(), "eyJ-flat");
        assert!(creds.account_id.is_none());
    }

    #[test]
    fn codex_empty_token_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("auth.json"),
            serde_json::json!({ "tokens": { "access_token": "" } }).to_string(),
        )
        .unwrap();

        assert!(CodexAuthFile::at_home(dir.path()).load().is_none());
    }
}
