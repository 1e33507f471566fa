//! Configuration Management
//!
//! Handles persistent configuration for ag.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Registry used when nothing else is configured
pub const DEFAULT_REGISTRY_URI: &str = "https://registry.arigato.sh";

/// Environment variable holding the session token
pub const TOKEN_ENV: &str = "AG_TOKEN";

/// Environment variable holding the registry URI
pub const REGISTRY_ENV: &str = "AG_REGISTRY_URI";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Registry base URI
    #[serde(default)]
    pub registry_uri: Option<String>,
    /// Session token sent as a bearer credential
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("arigato").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Override the registry (CLI flag or environment)
    pub fn with_registry_uri(mut self, registry_uri: Option<String>) -> Self {
        if registry_uri.is_some() {
            self.registry_uri = registry_uri;
        }
        self
    }

    /// Get effective registry (override > config > default)
    pub fn effective_registry_uri(&self) -> String {
        self.registry_uri
            .clone()
            .filter(|uri| !uri.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY_URI.to_string())
    }

    /// Get effective token (environment > config)
    pub fn effective_auth_token(&self) -> Option<String> {
        resolve_token(std::env::var(TOKEN_ENV).ok(), self.auth_token.clone())
    }
}

fn resolve_token(env: Option<String>, file: Option<String>) -> Option<String> {
    env.filter(|t| !t.trim().is_empty())
        .or(file)
        .filter(|t| !t.trim().is_empty())
}
