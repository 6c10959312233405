use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "https://wallet.b.goit.study/api".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RatesConfig {
    pub base_url: String,
    /// Currency the rates are quoted against.
    pub base_currency: String,
    pub currencies: Vec<String>,
    pub freshness_minutes: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        RatesConfig {
            base_url: "https://api.monobank.ua".to_string(),
            base_currency: "UAH".to_string(),
            currencies: vec!["USD".to_string(), "EUR".to_string()],
            freshness_minutes: 60,
        }
    }
}

impl RatesConfig {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_minutes * 60)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub rates: RatesConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to the
    /// built-in defaults when no file exists yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("study", "goit", "moneyguard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("study", "goit", "moneyguard")
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
  base_url: "http://localhost:3000/api"
rates:
  base_url: "http://localhost:4000"
  currencies: ["USD", "GBP"]
  freshness_minutes: 15
data_path: "/tmp/moneyguard"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.rates.base_url, "http://localhost:4000");
        assert_eq!(config.rates.currencies, vec!["USD", "GBP"]);
        // Unset keys keep their defaults
        assert_eq!(config.rates.base_currency, "UAH");
        assert_eq!(config.rates.freshness_window(), Duration::from_secs(900));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/moneyguard")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.api.base_url, "https://wallet.b.goit.study/api");
        assert_eq!(config.rates.base_url, "https://api.monobank.ua");
        assert_eq!(config.rates.currencies, vec!["USD", "EUR"]);
        assert_eq!(config.rates.freshness_window(), Duration::from_secs(3600));
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/definitely/not/here/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
