//! Configuration settings for coingrid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `COINGRID__POLLING__SHORT_COOLDOWN_MS=250`.
const ENV_PREFIX: &str = "COINGRID";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exchange configuration.
    pub exchange: ExchangeConfig,
    /// Polling loop pacing.
    pub polling: PollingConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Portfolio persistence.
    pub storage: StorageConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from a TOML file layered with environment overrides.
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(Self::default_path);

        let settings = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(Self::default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn default_path() -> PathBuf {
        super::config_dir()
            .map(|p| p.join("config.toml"))
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }
}

/// Exchange configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// REST API base URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ExchangeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Polling loop pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay after a pass in which every configured row had a price.
    pub short_cooldown_ms: u64,
    /// Delay after a pass that left some configured row without a price.
    pub long_interval_ms: u64,
    /// Granularity at which sleeps observe a stop request.
    pub sleep_increment_ms: u64,
    /// How long `stop` waits for the worker to finish.
    pub stop_timeout_ms: u64,
    /// Seconds between progress summaries.
    pub report_interval_secs: u64,
}

impl PollingConfig {
    pub fn short_cooldown(&self) -> Duration {
        Duration::from_millis(self.short_cooldown_ms)
    }

    pub fn long_interval(&self) -> Duration {
        Duration::from_millis(self.long_interval_ms)
    }

    /// Never zero, so a sleep always makes progress.
    pub fn sleep_increment(&self) -> Duration {
        Duration::from_millis(self.sleep_increment_ms.max(1))
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            short_cooldown_ms: 500,
            long_interval_ms: 2_000,
            sleep_increment_ms: 100,
            stop_timeout_ms: 1_000,
            report_interval_secs: 60,
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds for draining the update queue.
    pub tick_rate_ms: u64,
}

impl UiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 100 }
    }
}

/// Portfolio persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Portfolio file. Defaults to `portfolio.json` in the data directory.
    pub portfolio_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the portfolio file path.
    pub fn portfolio_path(&self) -> crate::Result<PathBuf> {
        match &self.portfolio_path {
            Some(path) => Ok(path.clone()),
            None => super::data_dir().map(|dir| dir.join("portfolio.json")),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub filter: String,
    /// Also write a daily-rolling log file into the log directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "coingrid=info".to_string(),
            file: false,
        }
    }
}
