use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::SessionAuth;
use crate::error::{ReportError, Result};
use crate::fmt::{Currency, Grouping};

pub const API_URL_VAR: &str = "REPORTDESK_API_URL";
pub const TOKEN_VAR: &str = "REPORTDESK_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub grouping: Grouping,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_api_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_export_dir() -> String {
    "~/Downloads".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            currency_symbol: default_currency_symbol(),
            grouping: Grouping::default(),
            export_dir: default_export_dir(),
        }
    }
}

impl Settings {
    pub fn currency(&self) -> Currency {
        Currency::new(self.currency_symbol.clone(), self.grouping)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn export_path(&self) -> PathBuf {
        expand_home(&self.export_dir)
    }

    /// Layer environment variables over file values. Empty values are
    /// treated as unset.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = var(API_URL_VAR) {
            self.api_url = url;
        }
        if let Some(token) = var(TOKEN_VAR) {
            self.token = Some(token);
        }
        self
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("reportdesk")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_from(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            Settings::default()
        }),
        Err(_) => Settings::default(),
    }
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ReportError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn load_settings() -> Settings {
    load_from(&settings_path())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_to(&settings_path(), settings)
}

/// File settings with environment overrides applied.
pub fn effective_settings() -> Settings {
    load_settings().with_env(|name| std::env::var(name).ok())
}

pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) => {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(rest.trim_start_matches(['/', '\\']))
        }
        None => PathBuf::from(path),
    }
}

/// Token from settings or the environment. A 401 logs the user out; the
/// settings file is only rewritten when it holds the rejected token.
#[derive(Debug)]
pub struct StoredSession {
    path: PathBuf,
    token: Mutex<Option<String>>,
}

impl StoredSession {
    pub fn new(path: PathBuf, token: Option<String>) -> Self {
        Self {
            path,
            token: Mutex::new(token),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings_path(), settings.token.clone())
    }

    /// Remove `rejected` from the settings file. Returns whether the file
    /// held it.
    fn forget_stored_token(&self, rejected: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let mut settings = load_from(&self.path);
        if settings.token.as_deref() != Some(rejected) {
            return Ok(false);
        }
        settings.token = None;
        save_to(&self.path, &settings)?;
        Ok(true)
    }
}

impl SessionAuth for StoredSession {
    fn current_token(&self) -> Option<String> {
        self.token.lock().ok()?.clone()
    }

    fn on_unauthorized(&self) {
        let rejected = match self.token.lock() {
            Ok(mut t) => t.take(),
            Err(_) => None,
        };
        let Some(rejected) = rejected else {
            return;
        };
        match self.forget_stored_token(&rejected) {
            Ok(true) => eprintln!("Stored access token was rejected and has been cleared."),
            Ok(false) => eprintln!("Access token was rejected (check {TOKEN_VAR})."),
            Err(e) => tracing::warn!(error = %e, "could not clear stored token"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            api_url: "https://pos.example.com/api/v1".to_string(),
            token: Some("abc".to_string()),
            timeout_secs: 10,
            currency_symbol: "$".to_string(),
            grouping: Grouping::Western,
            export_dir: "/tmp/exports".to_string(),
        };
        save_to(&path, &settings).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("}\n"));
        assert_eq!(load_from(&path), settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_from(&dir.path().join("nope.json"));
        assert_eq!(s, Settings::default());
        assert_eq!(s.api_url, "http://localhost:8000/api/v1");
        assert_eq!(s.timeout_secs, 30);
        assert_eq!(s.currency(), Currency::default());
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_from(&path), Settings::default());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"api_url": "http://10.0.0.5:8000/api/v1", "grouping": "western"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.api_url, "http://10.0.0.5:8000/api/v1");
        assert_eq!(s.grouping, Grouping::Western);
        assert_eq!(s.currency_symbol, "₹");
        assert!(s.token.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let s = Settings::default().with_env(|name| match name {
            API_URL_VAR => Some("http://pos:9000/api/v1".to_string()),
            TOKEN_VAR => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(s.api_url, "http://pos:9000/api/v1");
        assert!(s.token.is_none());
    }

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_home("~/Downloads"), home.join("Downloads"));
        assert_eq!(expand_home("/srv/out"), PathBuf::from("/srv/out"));
    }

    #[test]
    fn test_unauthorized_clears_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            token: Some("stale".to_string()),
            ..Settings::default()
        };
        save_to(&path, &settings).unwrap();

        let session = StoredSession::new(path.clone(), settings.token.clone());
        assert_eq!(session.current_token().as_deref(), Some("stale"));
        session.on_unauthorized();
        assert!(session.current_token().is_none());
        assert!(load_from(&path).token.is_none());
        assert_eq!(load_from(&path).api_url, settings.api_url);
    }

    #[test]
    fn test_unauthorized_env_token_keeps_file_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let stored = Settings {
            token: Some("good-file-token".to_string()),
            ..Settings::default()
        };
        save_to(&path, &stored).unwrap();

        let effective = stored.clone().with_env(|name| match name {
            TOKEN_VAR => Some("bad-env-token".to_string()),
            _ => None,
        });
        let session = StoredSession::new(path.clone(), effective.token);
        assert_eq!(session.current_token().as_deref(), Some("bad-env-token"));
        session.on_unauthorized();
        assert!(session.current_token().is_none());
        assert_eq!(load_from(&path).token.as_deref(), Some("good-file-token"));
    }
}
