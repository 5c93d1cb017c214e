use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Which header carries the API credential. Deployments differ.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    #[default]
    Bearer,
    /// `X-API-KEY: <key>`
    XApiKey,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub auth: AuthScheme,
    #[serde(default)]
    pub key: Option<String>,
}

impl ApiConfig {
    /// Credential from the config file, or the `ECLESIAR_API_KEY`
    /// environment variable as a fallback.
    pub fn resolve_key(&self) -> Result<String> {
        self.key
            .clone()
            .or_else(|| std::env::var("ECLESIAR_API_KEY").ok())
            .context(
                "No API key: set api.key in the config or the ECLESIAR_API_KEY environment variable",
            )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "https://api.eclesiar.com".to_string(),
            auth: AuthScheme::Bearer,
            key: None,
        }
    }
}

fn default_collection() -> String {
    "currency_prices".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    /// Directory for the embedded store. Platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            data_dir: None,
            collection: default_collection(),
        }
    }
}

impl StoreConfig {
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => AppConfig::default_data_path(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "goldwatch", "goldwatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "goldwatch", "goldwatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api:
  base_url: "https://api.eclesiar.com"
  key: "secret"
store:
  collection: "currency_prices"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api.base_url, "https://api.eclesiar.com");
        assert_eq!(config.api.auth, AuthScheme::Bearer);
        assert_eq!(config.api.key, Some("secret".to_string()));
        assert!(config.store.data_dir.is_none());
        assert_eq!(config.store.collection, "currency_prices");
    }

    #[test]
    fn test_auth_scheme_variants() {
        let yaml_str = r#"
api:
  base_url: "http://example.com"
  auth: x-api-key
store:
  data_dir: "/tmp/goldwatch"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.api.auth, AuthScheme::XApiKey);
        assert_eq!(config.store.data_dir, Some(PathBuf::from("/tmp/goldwatch")));
        assert_eq!(config.store.collection, "currency_prices");
    }

    #[test]
    fn test_key_resolution_prefers_config() {
        let config = ApiConfig {
            key: Some("from-config".to_string()),
            ..ApiConfig::default()
        };
        assert_eq!(config.resolve_key().unwrap(), "from-config");
    }
}
