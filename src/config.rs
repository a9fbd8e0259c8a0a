use anyhow::Context;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use stockdash::prelude::{CsvFetcher, MarketDataFetcher, YahooClient, DEFAULT_MARKET_TIMEZONE, DEFAULT_TICKER};
use stockdash::services::yahoo::YAHOO_BASE_URL;
use stockdash::utils::parse_timezone;

// Which market data provider backs the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Yahoo,
    Csv,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "csv" => Ok(ProviderKind::Csv),
            other => anyhow::bail!("Unknown PROVIDER '{}', expected 'yahoo' or 'csv'", other),
        }
    }
}

// Inbound request limits per client IP
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 10,
            burst_size: 20,
        }
    }
}

// YAML-serializable configuration structure
#[derive(Serialize, Deserialize, Debug)]
pub struct ConfigYaml {
    pub node_name: String,
    pub environment: String,
    pub port: u16,
    pub default_ticker: Option<String>,
    pub market_timezone: Option<String>,
    pub provider: Option<ProviderKind>,
    pub data_dir: Option<String>,
    pub yahoo_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub random_user_agent: Option<bool>,
    pub rate_limit: Option<RateLimitConfig>,
}

// Holds application-wide settings
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub node_name: String,
    pub environment: String,
    pub port: u16,
    pub default_ticker: String,
    pub market_timezone: Tz,
    pub provider: ProviderKind,
    pub data_dir: PathBuf,
    pub yahoo_base_url: String,
    pub request_timeout: Duration,
    pub random_user_agent: bool,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    // Load configuration from YAML file or environment variables
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(config_file) = env::var("CONFIG_FILE") {
            Self::from_yaml(&config_file)
        } else {
            Self::from_env()
        }
    }

    pub fn from_yaml(file_path: &str) -> anyhow::Result<Self> {
        let yaml_content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read config file {}", file_path))?;
        Self::from_yaml_str(&yaml_content)
    }

    pub fn from_yaml_str(yaml_content: &str) -> anyhow::Result<Self> {
        let yaml_config: ConfigYaml = serde_yaml::from_str(yaml_content).context("Failed to parse YAML config")?;

        let market_timezone = parse_timezone(
            yaml_config
                .market_timezone
                .as_deref()
                .unwrap_or(DEFAULT_MARKET_TIMEZONE),
        )?;

        Ok(Self {
            node_name: yaml_config.node_name,
            environment: yaml_config.environment,
            port: yaml_config.port,
            default_ticker: yaml_config.default_ticker.unwrap_or_else(|| DEFAULT_TICKER.to_string()),
            market_timezone,
            provider: yaml_config.provider.unwrap_or(ProviderKind::Yahoo),
            data_dir: PathBuf::from(yaml_config.data_dir.unwrap_or_else(|| "./data".to_string())),
            yahoo_base_url: yaml_config.yahoo_base_url.unwrap_or_else(|| YAHOO_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(yaml_config.request_timeout_secs.unwrap_or(30)),
            random_user_agent: yaml_config.random_user_agent.unwrap_or(true),
            rate_limit: yaml_config.rate_limit.unwrap_or_default(),
        })
    }

    // Load all configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
        where
            T::Err: std::fmt::Display,
        {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)),
                None => Ok(default),
            }
        }

        let market_timezone =
            parse_timezone(&lookup("MARKET_TIMEZONE").unwrap_or_else(|| DEFAULT_MARKET_TIMEZONE.to_string()))?;

        Ok(Self {
            node_name: lookup("NODE_NAME").unwrap_or_else(|| "stockdash-web".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parsed(&lookup, "PORT", 8501)?,
            default_ticker: lookup("DEFAULT_TICKER").unwrap_or_else(|| DEFAULT_TICKER.to_string()),
            market_timezone,
            provider: parsed(&lookup, "PROVIDER", ProviderKind::Yahoo)?,
            data_dir: PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "./data".to_string())),
            yahoo_base_url: lookup("YAHOO_BASE_URL").unwrap_or_else(|| YAHOO_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(parsed(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
            random_user_agent: parsed(&lookup, "RANDOM_USER_AGENT", true)?,
            rate_limit: RateLimitConfig {
                per_second: parsed(&lookup, "RATE_LIMIT_PER_SECOND", 10)?,
                burst_size: parsed(&lookup, "RATE_LIMIT_BURST", 20)?,
            },
        })
    }

    /// Market data provider selected by `provider`
    pub fn build_fetcher(&self) -> anyhow::Result<Arc<dyn MarketDataFetcher>> {
        let fetcher: Arc<dyn MarketDataFetcher> = match self.provider {
            ProviderKind::Yahoo => Arc::new(
                YahooClient::new(self.random_user_agent, self.request_timeout)?.with_base_url(&self.yahoo_base_url),
            ),
            ProviderKind::Csv => Arc::new(CsvFetcher::new(&self.data_dir)),
        };
        Ok(fetcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.port, 8501);
        assert_eq!(config.default_ticker, "AAPL");
        assert_eq!(config.market_timezone, Tz::America__New_York);
        assert_eq!(config.provider, ProviderKind::Yahoo);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.random_user_agent);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("PROVIDER", "CSV"),
            ("DATA_DIR", "/srv/prices"),
            ("MARKET_TIMEZONE", "Europe/London"),
            ("RATE_LIMIT_BURST", "5"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.provider, ProviderKind::Csv);
        assert_eq!(config.data_dir, PathBuf::from("/srv/prices"));
        assert_eq!(config.market_timezone, Tz::Europe__London);
        assert_eq!(config.rate_limit.burst_size, 5);
        assert_eq!(config.build_fetcher().unwrap().name(), "csv");
    }

    #[test]
    fn test_env_rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("PROVIDER", "bloomberg")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("MARKET_TIMEZONE", "Nowhere/City")])).is_err());
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r#"
node_name: dash-1
environment: production
port: 8080
provider: yahoo
market_timezone: Asia/Tokyo
rate_limit:
  per_second: 2
  burst_size: 4
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.node_name, "dash-1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.market_timezone, Tz::Asia__Tokyo);
        assert_eq!(config.default_ticker, "AAPL");
        assert_eq!(config.rate_limit, RateLimitConfig { per_second: 2, burst_size: 4 });
        assert_eq!(config.build_fetcher().unwrap().name(), "yahoo");
    }
}
