//! Configuration management for curator.
//!
//! Loads settings from `--config <path>`, then the user config dir
//! (`curator/config.toml`), then defaults. Every field has a serde default
//! so partial files are fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::collections::Identity;

/// Environment variable overriding the service base URL
pub const API_BASE_ENV: &str = "CURATOR_API_BASE";

/// Remote service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the search/assistant API (e.g. http://localhost:8000/api/v1)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client timeout in seconds, 0 disables it
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Search request shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Providers queried in one federated search
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
}

fn default_page_size() -> u32 {
    20
}

fn default_sources() -> Vec<String> {
    ["openalex", "pubmed", "crossref", "arxiv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_history_cap() -> usize {
    curator_common::history::DEFAULT_HISTORY_CAP
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            sources: default_sources(),
            history_cap: default_history_cap(),
        }
    }
}

/// AI assistant settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Response language requested from the model
    #[serde(default = "default_language")]
    pub language: String,

    /// Minimum time the recommendation progress indicator stays up
    #[serde(default = "default_min_progress")]
    pub min_progress_ms: u64,

    /// Pause shown on the "preparing context" stage
    #[serde(default = "default_context_prep")]
    pub context_prep_ms: u64,
}

fn default_language() -> String {
    "pt-BR".to_string()
}

fn default_min_progress() -> u64 {
    1200
}

fn default_context_prep() -> u64 {
    250
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            min_progress_ms: default_min_progress(),
            context_prep_ms: default_context_prep(),
        }
    }
}

impl AssistantConfig {
    pub fn min_progress(&self) -> Duration {
        Duration::from_millis(self.min_progress_ms)
    }

    pub fn context_prep(&self) -> Duration {
        Duration::from_millis(self.context_prep_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Empty means the platform data dir
    #[serde(default)]
    pub state_file: String,
}

impl StorageConfig {
    pub fn state_path(&self) -> Option<PathBuf> {
        if self.state_file.trim().is_empty() {
            dirs::data_dir().map(|d| d.join("curator").join("state.json"))
        } else {
            Some(PathBuf::from(&self.state_file))
        }
    }
}

/// Who owns collections and signs comments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,
}

fn default_subject() -> String {
    "local".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            name: String::new(),
            email: String::new(),
        }
    }
}

impl IdentityConfig {
    pub fn to_identity(&self) -> Identity {
        let mut identity = Identity::new(self.subject.trim());
        if !self.name.trim().is_empty() {
            identity = identity.with_name(self.name.trim());
        }
        if !self.email.trim().is_empty() {
            identity = identity.with_email(self.email.trim());
        }
        identity
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub identity: IdentityConfig,
}

impl Config {
    /// Load config from an explicit path or the user config dir, or return defaults.
    /// The API base env var is applied last.
    pub fn load(explicit: Option<&Path>) -> Self {
        let candidate = explicit
            .map(Path::to_path_buf)
            .or_else(default_config_path);

        let mut config = match candidate {
            Some(path) if explicit.is_some() || path.exists() => {
                Self::load_from_path(&path).unwrap_or_else(|e| {
                    warn!("Config unusable, using defaults: {:#}", e);
                    Config::default()
                })
            }
            _ => Config::default(),
        };

        if let Ok(base) = std::env::var(API_BASE_ENV) {
            config.apply_api_base(&base);
        }
        config
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_api_base(&mut self, base: &str) {
        let base = base.trim();
        if !base.is_empty() {
            self.service.base_url = base.trim_end_matches('/').to_string();
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("curator").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.service.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.search.page_size, 20);
        assert_eq!(config.search.sources.len(), 4);
        assert_eq!(config.search.history_cap, 8);
        assert_eq!(config.assistant.min_progress_ms, 1200);
        assert_eq!(config.assistant.language, "pt-BR");
    }

    #[test]
    fn test_partial_file_falls_back_per_field() {
        let config: Config = toml::from_str(
            r#"
            [search]
            page_size = 5

            [assistant]
            min_progress_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.search.page_size, 5);
        assert_eq!(config.search.sources, default_sources());
        assert_eq!(config.assistant.min_progress_ms, 0);
        assert_eq!(config.assistant.context_prep_ms, 250);
        assert_eq!(config.service.timeout_secs, 60);
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let service = ServiceConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(service.timeout(), None);
        assert_eq!(
            ServiceConfig::default().timeout(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service]\nbase_url = \"http://example.test/api\"").unwrap();
        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.service.base_url, "http://example.test/api");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service\nbase_url = ").unwrap();
        assert!(Config::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_api_base_trims_trailing_slash() {
        let mut config = Config::default();
        config.apply_api_base("http://host:9000/api/v1/ ");
        assert_eq!(config.service.base_url, "http://host:9000/api/v1");
        config.apply_api_base("   ");
        assert_eq!(config.service.base_url, "http://host:9000/api/v1");
    }

    #[test]
    fn test_identity_section() {
        assert_eq!(Config::default().identity.to_identity(), Identity::new("local"));

        let config: Config = toml::from_str(
            r#"
            [identity]
            subject = "user-ana"
            name = "Ana Souza"
            email = " "
            "#,
        )
        .unwrap();
        let identity = config.identity.to_identity();
        assert_eq!(identity.subject, "user-ana");
        assert_eq!(identity.name.as_deref(), Some("Ana Souza"));
        assert_eq!(identity.email, None);
    }

    #[test]
    fn test_explicit_state_file() {
        let storage = StorageConfig {
            state_file: "/tmp/curator-state.json".to_string(),
        };
        assert_eq!(
            storage.state_path(),
            Some(PathBuf::from("/tmp/curator-state.json"))
        );
    }
}
