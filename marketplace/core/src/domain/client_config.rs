// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Client Configuration Types
//
// Defines the configuration schema for AgentStore clients, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Backend endpoint and request timeout
// - Session file location
// - Degraded-data fallback and snapshot seeding
// - Marketplace visibility rules

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const API_VERSION: &str = "agentstore.io/v1";
pub const KIND: &str = "ClientConfig";

/// Top-level Kubernetes-style client configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfigManifest {
    /// API version (must be "agentstore.io/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ClientConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: ClientConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Profile name, e.g. "production" or "staging"
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfigSpec {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,

    #[serde(default)]
    pub marketplace: MarketplaceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, e.g. "https://api.agentstore.io"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Timeouts are not retried.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session file (default: ~/.agentstore/session.json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Serve labelled degraded data when the backend is unreachable
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// JSON snapshot used to seed the cache and the offline backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshot_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Whether listings with no `status` field appear in the marketplace
    #[serde(default = "default_true")]
    pub unset_status_visible: bool,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            unset_status_visible: true,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for ClientConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "default".to_string(),
                labels: None,
            },
            spec: ClientConfigSpec::default(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ClientConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file in standard locations
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("AGENTSTORE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./agentstore-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".agentstore").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/agentstore/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load from an explicit path, else discovery, else defaults.
    /// Environment overrides are applied in every case.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("AGENTSTORE_API_URL") {
            tracing::info!("Environment override: AGENTSTORE_API_URL={}", url);
            self.spec.api.base_url = url;
        }

        if let Ok(val) = std::env::var("AGENTSTORE_API_TIMEOUT_SECONDS") {
            match val.parse::<u64>() {
                Ok(seconds) => self.spec.api.timeout_seconds = seconds,
                Err(_) => tracing::warn!(
                    "Invalid value for AGENTSTORE_API_TIMEOUT_SECONDS: '{}'. Ignoring.",
                    val
                ),
            }
        }

        if let Ok(val) = std::env::var("AGENTSTORE_FALLBACK") {
            match parse_bool(&val) {
                Some(enabled) => {
                    tracing::info!("Environment override: AGENTSTORE_FALLBACK={}", enabled);
                    self.spec.fallback.enabled = enabled;
                }
                None => tracing::warn!(
                    "Invalid value for AGENTSTORE_FALLBACK: '{}'. Expected true/false. Ignoring.",
                    val
                ),
            }
        }
    }

    pub fn session_path(&self) -> Option<PathBuf> {
        self.spec
            .session
            .path
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(".agentstore").join("session.json")))
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let url = url::Url::parse(&self.spec.api.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid spec.api.base_url '{}': {}", self.spec.api.base_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("spec.api.base_url must use http or https");
        }

        if !(1..=120).contains(&self.spec.api.timeout_seconds) {
            anyhow::bail!(
                "spec.api.timeout_seconds must be between 1 and 120, got {}",
                self.spec.api.timeout_seconds
            );
        }

        if let Some(snapshot) = &self.spec.fallback.snapshot_path {
            if !snapshot.exists() {
                anyhow::bail!("Fallback snapshot not found: {}", snapshot.display());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = ClientConfigManifest::default();
        assert_eq!(manifest.api_version, API_VERSION);
        assert_eq!(manifest.kind, KIND);
        assert_eq!(manifest.spec.api.timeout_seconds, 10);
        assert!(manifest.spec.fallback.enabled);
        assert!(manifest.spec.marketplace.unset_status_visible);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_minimal_yaml_fills_defaults() {
        let yaml = r#"
apiVersion: agentstore.io/v1
kind: ClientConfig
metadata:
  name: staging
spec:
  api:
    base_url: https://staging.agentstore.io/api
  marketplace:
    unset_status_visible: false
"#;
        let manifest: ClientConfigManifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.metadata.name, "staging");
        assert_eq!(manifest.spec.api.base_url, "https://staging.agentstore.io/api");
        assert_eq!(manifest.spec.api.timeout_seconds, 10);
        assert!(!manifest.spec.marketplace.unset_status_visible);
        assert!(manifest.spec.fallback.enabled);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut manifest = ClientConfigManifest::default();

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "NodeConfig".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.api.base_url = "ftp://example.com".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.api.base_url = "https://api.example.com".to_string();

        manifest.spec.api.timeout_seconds = 0;
        assert!(manifest.validate().is_err());
        manifest.spec.api.timeout_seconds = 5;

        manifest.spec.fallback.snapshot_path = Some(PathBuf::from("/nonexistent/snapshot.json"));
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agentstore-config.yaml");
        let mut manifest = ClientConfigManifest::default();
        manifest.metadata.name = "local".to_string();
        std::fs::write(&path, manifest.to_yaml_string().unwrap()).unwrap();

        let loaded = ClientConfigManifest::from_yaml_file(&path).unwrap();
        assert_eq!(loaded.metadata.name, "local");
        assert_eq!(loaded.spec.api.base_url, manifest.spec.api.base_url);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
