use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Categories where several subscriptions are expected and never flagged.
pub const DEFAULT_SAFE_CATEGORIES: &[&str] = &[
    "Personal",
    "Work",
    "Uncategorized",
    "General",
    "Utilities",
    "Entertainment",
    "Dev Tools",
    "Health",
    "Education",
];

/// Local user on whose behalf the CLI acts.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UserConfig {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            id: "local".to_string(),
            name: None,
            email: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateSourceKind {
    #[default]
    ExchangeRateApi,
    Frankfurter,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatesProviderConfig {
    #[serde(default)]
    pub source: RateSourceKind,
    pub base_url: Option<String>,
    #[serde(default)]
    pub retries: usize,
}

impl RatesProviderConfig {
    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.source) {
            (Some(url), _) => url,
            (None, RateSourceKind::ExchangeRateApi) => "https://api.exchangerate-api.com",
            (None, RateSourceKind::Frankfurter) => "https://api.frankfurter.app",
        }
    }
}

impl Default for RatesProviderConfig {
    fn default() -> Self {
        RatesProviderConfig {
            source: RateSourceKind::ExchangeRateApi,
            base_url: None,
            retries: 0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub rates: RatesProviderConfig,
}

fn default_rates_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_rates_ttl_secs")]
    pub rates_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            rates_ttl_secs: default_rates_ttl_secs(),
        }
    }
}

fn default_trial_window_days() -> i64 {
    2
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemindersConfig {
    #[serde(default = "default_trial_window_days")]
    pub trial_window_days: i64,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        RemindersConfig {
            trial_window_days: default_trial_window_days(),
        }
    }
}

fn default_safe_categories() -> Vec<String> {
    DEFAULT_SAFE_CATEGORIES
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InsightsConfig {
    #[serde(default = "default_safe_categories")]
    pub safe_categories: Vec<String>,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        InsightsConfig {
            safe_categories: default_safe_categories(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub user: UserConfig,
    /// Preferred currency for a user that has not chosen one yet.
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "subtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "subtrack")
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
