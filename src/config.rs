use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub languages: Option<Vec<String>>,
    pub region: Option<String>,
    pub category_id: Option<String>,
    pub max_results: Option<u32>,
    pub min_score: Option<i32>,
    pub output: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub retry: RetryPolicy,
}

impl Config {
    /// Load config from ~/.config/trendscout/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("trendscout")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
languages = ["es", "en"]
region = "GB"
max_results = 20
min_score = 2
output = "out/brief.json"
request_timeout_secs = 15

[retry]
max_attempts = 4
base_delay_ms = 500
rate_limit_multiplier = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.languages, Some(vec!["es".to_string(), "en".to_string()]));
        assert_eq!(config.region.as_deref(), Some("GB"));
        assert_eq!(config.max_results, Some(20));
        assert_eq!(config.min_score, Some(2));
        assert_eq!(config.output, Some(PathBuf::from("out/brief.json")));
        assert_eq!(config.request_timeout_secs, Some(15));
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.base_delay, Duration::from_millis(500));
        assert_eq!(config.retry.rate_limit_multiplier, 3);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.languages.is_none());
        assert!(config.region.is_none());
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"region = "FR""#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.region.as_deref(), Some("FR"));
        assert!(config.min_score.is_none());
        assert_eq!(config.retry.max_attempts, 3);
    }
}
