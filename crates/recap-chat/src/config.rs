//! LLM backend configuration and selection.
//!
//! Layers, lowest priority first: defaults → JSON config file → environment
//! → CLI overrides. Resolved once at startup and handed to
//! [`Backend::from_config`](crate::Backend::from_config).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use recap_core::{Error, Result};

use crate::types::BackendKind;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-08-01-preview";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_ollama_url")]
    pub ollama_base_url: String,
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_url")]
    pub openai_base_url: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default)]
    pub azure_api_key: Option<String>,
    #[serde(default)]
    pub azure_endpoint: Option<String>,
    #[serde(default)]
    pub azure_deployment: Option<String>,
    #[serde(default = "default_azure_api_version")]
    pub azure_api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.into()
}
fn default_ollama_model() -> String {
    DEFAULT_OLLAMA_MODEL.into()
}
fn default_openai_url() -> String {
    DEFAULT_OPENAI_URL.into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_azure_api_version() -> String {
    DEFAULT_AZURE_API_VERSION.into()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            ollama_base_url: default_ollama_url(),
            ollama_model: default_ollama_model(),
            openai_api_key: None,
            openai_base_url: default_openai_url(),
            openai_model: default_openai_model(),
            azure_api_key: None,
            azure_endpoint: None,
            azure_deployment: None,
            azure_api_version: default_azure_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Values given on the command line; they win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<BackendKind>,
    /// Model for the active backend (the deployment name on Azure).
    pub model: Option<String>,
}

impl LLMConfig {
    /// Build the full configuration: optional file, then process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config: LLMConfig = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        info!("Loaded LLM config from {}", path.display());
        Ok(config)
    }

    /// Overlay environment variables, looked up through `get`.
    pub fn apply_env_with<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("RECAP_BACKEND") {
            self.backend = v.parse()?;
        }
        if let Some(v) = get("OLLAMA_BASE_URL") {
            self.ollama_base_url = v;
        }
        if let Some(v) = get("OLLAMA_MODEL") {
            self.ollama_model = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai_api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            self.openai_base_url = v;
        }
        if let Some(v) = get("OPENAI_MODEL") {
            self.openai_model = v;
        }
        if let Some(v) = get("AZURE_OPENAI_API_KEY") {
            self.azure_api_key = Some(v);
        }
        if let Some(v) = get("AZURE_OPENAI_ENDPOINT") {
            self.azure_endpoint = Some(v);
        }
        if let Some(v) = get("AZURE_OPENAI_DEPLOYMENT") {
            self.azure_deployment = Some(v);
        }
        if let Some(v) = get("AZURE_OPENAI_API_VERSION") {
            self.azure_api_version = v;
        }
        if let Some(v) = get("RECAP_TIMEOUT_SECS") {
            self.timeout_secs = v
                .parse()
                .map_err(|_| Error::Config(format!("RECAP_TIMEOUT_SECS is not a number: {}", v)))?;
        }
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(model) = &overrides.model {
            match self.backend {
                BackendKind::Ollama => self.ollama_model = model.clone(),
                BackendKind::OpenAI => self.openai_model = model.clone(),
                BackendKind::Azure => self.azure_deployment = Some(model.clone()),
            }
        }
        debug!("Backend after overrides: {}", self.backend);
    }

    /// Model identifier sent with each request for the active backend.
    pub fn model(&self) -> String {
        match self.backend {
            BackendKind::Ollama => self.ollama_model.clone(),
            BackendKind::OpenAI => self.openai_model.clone(),
            BackendKind::Azure => self.azure_deployment.clone().unwrap_or_default(),
        }
    }

    /// Check that the active backend has everything it needs.
    ///
    /// The error names every missing environment variable at once.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = match self.backend {
            BackendKind::Ollama => Vec::new(),
            BackendKind::OpenAI => [("OPENAI_API_KEY", self.openai_api_key.is_some())]
                .into_iter()
                .filter(|(_, present)| !present)
                .map(|(name, _)| name)
                .collect(),
            BackendKind::Azure => [
                ("AZURE_OPENAI_API_KEY", self.azure_api_key.is_some()),
                ("AZURE_OPENAI_ENDPOINT", self.azure_endpoint.is_some()),
                ("AZURE_OPENAI_DEPLOYMENT", self.azure_deployment.is_some()),
            ]
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect(),
        };

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "{} backend is missing: {}",
                self.backend,
                missing.join(", ")
            )))
        }
    }
}

/// Show only the last four characters of a secret.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LLMConfig::default();
        assert_eq!(config.backend, BackendKind::Ollama);
        assert_eq!(config.model(), "llama3.2");
        assert_eq!(config.ollama_base_url, "http://localhost:11434");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_layer() {
        let mut config = LLMConfig::default();
        config
            .apply_env_with(env(&[
                ("RECAP_BACKEND", "azure"),
                ("AZURE_OPENAI_API_KEY", "az-secret"),
                ("AZURE_OPENAI_ENDPOINT", "https://corp.openai.azure.com"),
                ("AZURE_OPENAI_DEPLOYMENT", "gpt4o-prod"),
                ("OPENAI_MODEL", "   "),
            ]))
            .unwrap();

        assert_eq!(config.backend, BackendKind::Azure);
        assert_eq!(config.model(), "gpt4o-prod");
        assert_eq!(config.openai_model, DEFAULT_OPENAI_MODEL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = LLMConfig::default();
        assert!(config
            .apply_env_with(env(&[("RECAP_BACKEND", "bard")]))
            .is_err());
        assert!(config
            .apply_env_with(env(&[("RECAP_TIMEOUT_SECS", "soon")]))
            .is_err());
    }

    #[test]
    fn test_validate_lists_all_missing() {
        let config = LLMConfig {
            backend: BackendKind::Azure,
            azure_endpoint: Some("https://corp.openai.azure.com".into()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("AZURE_OPENAI_API_KEY"));
        assert!(err.contains("AZURE_OPENAI_DEPLOYMENT"));
        assert!(!err.contains("AZURE_OPENAI_ENDPOINT"));

        let config = LLMConfig {
            backend: BackendKind::OpenAI,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides_target_active_backend() {
        let mut config = LLMConfig::default();
        config.apply_overrides(&ConfigOverrides {
            backend: Some(BackendKind::OpenAI),
            model: Some("gpt-4o".into()),
        });
        assert_eq!(config.backend, BackendKind::OpenAI);
        assert_eq!(config.openai_model, "gpt-4o");
        assert_eq!(config.ollama_model, DEFAULT_OLLAMA_MODEL);

        config.apply_overrides(&ConfigOverrides {
            backend: Some(BackendKind::Azure),
            model: Some("my-deployment".into()),
        });
        assert_eq!(config.model(), "my-deployment");
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recap.json");
        std::fs::write(&path, r#"{"backend": "openai", "openai_api_key": "sk-file"}"#).unwrap();

        let config = LLMConfig::from_file(&path).unwrap();
        assert_eq!(config.backend, BackendKind::OpenAI);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.openai_model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            LLMConfig::from_file(&dir.path().join("missing.json")),
            Err(Error::Config(_))
        ));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(LLMConfig::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-abcdef1234"), "*********1234");
        assert_eq!(mask_key("abc"), "***");
    }
}
