//! Configuration types for api-aggregator

use crate::classifier::{Classifier, ClassifierRule, default_rules};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, time::Duration};

/// Main configuration
///
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream fetch behavior (timeout, retry)
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Result cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Source classification rules
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// REST API settings
    #[serde(default)]
    pub server: ApiConfig,
}

impl Config {
    /// Load a JSON configuration file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout.is_zero() {
            return Err(Error::config(
                "fetch.timeout",
                "fetch timeout must be greater than zero",
            ));
        }

        let multiplier = self.fetch.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(Error::config(
                "fetch.retry.backoff_multiplier",
                format!("backoff multiplier must be a finite number >= 1.0, got {multiplier}"),
            ));
        }

        if let Some(index) = self
            .classifier
            .rules
            .iter()
            .position(|rule| rule.pattern.is_empty())
        {
            return Err(Error::config(
                format!("classifier.rules[{index}].pattern"),
                "classifier pattern must not be empty",
            ));
        }

        if self.cache.enabled {
            if self.cache.sliding_expiration.is_zero() {
                return Err(Error::config(
                    "cache.sliding_expiration",
                    "sliding expiration must be greater than zero when the cache is enabled",
                ));
            }
            if self.cache.absolute_expiration.is_zero() {
                return Err(Error::config(
                    "cache.absolute_expiration",
                    "absolute expiration must be greater than zero when the cache is enabled",
                ));
            }
            if self.cache.sweep_interval.is_zero() {
                return Err(Error::config(
                    "cache.sweep_interval",
                    "sweep interval must be greater than zero when the cache is enabled",
                ));
            }
        }

        Ok(())
    }
}

/// Upstream fetch configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout of a single attempt, in seconds (default: 5)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent upstream
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Retry policy for failed attempts
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry configuration for failed fetch attempts
///
/// The defaults make three immediate attempts. Setting `initial_delay` turns on
/// exponential backoff.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt (default: 0 seconds)
    #[serde(default, with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between attempts (default: 0 seconds)
    #[serde(default, with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 1.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Result cache configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Memoize aggregate results (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Idle time after which an entry expires, in seconds (default: 45)
    #[serde(default = "default_sliding_expiration", with = "duration_serde")]
    pub sliding_expiration: Duration,

    /// Age after which an entry expires regardless of access, in seconds (default: 300)
    #[serde(default = "default_absolute_expiration", with = "duration_serde")]
    pub absolute_expiration: Duration,

    /// Coalesce concurrent misses for the same key into one computation (default: true)
    #[serde(default = "default_true")]
    pub single_flight: bool,

    /// How often the background sweeper purges expired entries, in seconds (default: 60)
    #[serde(default = "default_sweep_interval", with = "duration_serde")]
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sliding_expiration: default_sliding_expiration(),
            absolute_expiration: default_absolute_expiration(),
            single_flight: true,
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// Source classification rules, highest priority first
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Ordered substring rules
    #[serde(default = "default_rules")]
    pub rules: Vec<ClassifierRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl ClassifierConfig {
    /// Build the classifier described by these rules
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.rules.clone())
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_user_agent() -> String {
    concat!("api-aggregator/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

fn default_sliding_expiration() -> Duration {
    Duration::from_secs(45)
}

fn default_absolute_expiration() -> Duration {
    Duration::from_secs(300)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5080))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Durations are stored as whole seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
