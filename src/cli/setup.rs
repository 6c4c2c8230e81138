use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Creates a default configuration file at the default location
pub fn setup() -> Result<()> {
    setup_at_path(AppConfig::default_config_path()?)
}

/// Creates a default configuration file with example content at the specified path
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;
    tracing::info!("Created default configuration at {}", path.display());

    let config = AppConfig::load_from_path(path)?;
    println!("Created configuration at {}", path.display());
    if let Ok(data_path) = config.default_data_path() {
        println!("Subscriptions will be stored in {}", data_path.display());
    }
    println!("Add your first one with: subtrack add <NAME> --cost <AMOUNT>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RateSourceKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_setup_creates_config_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.yaml");

        setup_at_path(&config_path)?;

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path)?;
        assert!(content.contains("# Example configuration file for subtrack"));
        assert!(content.contains("providers:"));
        assert!(content.contains("currency:"));
        Ok(())
    }

    #[test]
    fn test_setup_fails_if_config_exists() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "test")?;

        let result = setup_at_path(&config_path);
        assert!(result.unwrap_err().to_string().contains("already exists"));
        Ok(())
    }

    #[test]
    fn test_example_config_is_valid_yaml() -> Result<()> {
        let config: AppConfig = serde_yaml::from_str(EXAMPLE_CONFIG)
            .context("Failed to parse example config as YAML")?;

        assert_eq!(config.user.id, "local");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.providers.rates.source, RateSourceKind::ExchangeRateApi);
        assert_eq!(config.cache.rates_ttl_secs, 3600);
        assert_eq!(config.insights.safe_categories.len(), 9);
        assert!(config.data_path.is_none());
        Ok(())
    }
}
