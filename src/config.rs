/// Service configuration loader - parses sentinel.toml
///
/// Separates tunables from code: backend URL, poll period, risk thresholds,
/// event log retention, and the optional status endpoint port can all change
/// without recompiling the service. Every section and field has a default,
/// so a missing file or a partial file is fine; the backend URL can also be
/// overridden from the environment (`SENTINEL_BACKEND_URL`, loadable from a
/// `.env` file).

use crate::risk::RiskThresholds;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Expected in the current working directory (project root when running via
/// `cargo run`).
pub const DEFAULT_CONFIG_PATH: &str = "sentinel.toml";

/// Environment override for the backend base URL.
pub const ENV_BACKEND_URL: &str = "SENTINEL_BACKEND_URL";

// ---------------------------------------------------------------------------
// TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    backend: BackendSection,
    #[serde(default)]
    polling: PollingSection,
    #[serde(default)]
    risk: RiskSection,
    #[serde(default)]
    log: LogSection,
    #[serde(default)]
    endpoint: EndpointSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct BackendSection {
    base_url: String,
    timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        BackendSection {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PollingSection {
    interval_ms: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        PollingSection { interval_ms: 1000 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RiskSection {
    high_cusecs: f64,
    critical_cusecs: f64,
}

impl Default for RiskSection {
    fn default() -> Self {
        let t = RiskThresholds::default();
        RiskSection {
            high_cusecs: t.high_cusecs,
            critical_cusecs: t.critical_cusecs,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LogSection {
    capacity: usize,
}

impl Default for LogSection {
    fn default() -> Self {
        LogSection {
            capacity: crate::eventlog::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EndpointSection {
    port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub thresholds: RiskThresholds,
    pub log_capacity: usize,
    pub endpoint_port: Option<u16>,
}

#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io(String),
    /// The config file could not be parsed as TOML.
    Parse(String),
    /// A field failed validation (e.g. threshold ordering).
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Failed to read configuration: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServiceConfig {
    /// Loads configuration from `path`, falling back to full defaults when
    /// the file does not exist. A file that exists but fails to read, parse,
    /// or validate is an error; a typo should not silently become defaults.
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Self::from_file(ConfigFile::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_file(file)
    }

    fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let thresholds = RiskThresholds::new(file.risk.high_cusecs, file.risk.critical_cusecs)
            .map_err(ConfigError::Invalid)?;

        if file.polling.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "polling.interval_ms must be greater than zero".to_string(),
            ));
        }

        let backend_url = env::var(ENV_BACKEND_URL).unwrap_or(file.backend.base_url);

        Ok(ServiceConfig {
            backend_url,
            request_timeout: Duration::from_secs(file.backend.timeout_secs),
            poll_interval: Duration::from_millis(file.polling.interval_ms),
            thresholds,
            log_capacity: file.log.capacity,
            endpoint_port: file.endpoint.port,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = ServiceConfig::load_or_default("definitely_not_here.toml")
            .expect("absent file should fall back to defaults");

        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert_eq!(config.thresholds, RiskThresholds::default());
        assert_eq!(config.log_capacity, 50);
        assert_eq!(config.endpoint_port, None);
    }

    #[test]
    fn test_partial_file_fills_remaining_defaults() {
        let config = ServiceConfig::from_toml_str(
            r#"
            [polling]
            interval_ms = 250

            [endpoint]
            port = 8080
            "#,
        )
        .expect("partial file should parse");

        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.endpoint_port, Some(8080));
        assert_eq!(config.thresholds, RiskThresholds::default(), "unset sections keep defaults");
    }

    #[test]
    fn test_threshold_ordering_violation_is_rejected() {
        let result = ServiceConfig::from_toml_str(
            r#"
            [risk]
            high_cusecs = 200000.0
            critical_cusecs = 100000.0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = ServiceConfig::from_toml_str(
            r#"
            [polling]
            interval_ms = 0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml_is_an_error_not_defaults() {
        let result = ServiceConfig::from_toml_str("[[[ nope");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_var_overrides_base_url() {
        // set_var is unsafe in edition 2024; this test owns the variable.
        unsafe { env::set_var(ENV_BACKEND_URL, "http://10.0.0.7:9000") };
        let config = ServiceConfig::from_toml_str(
            r#"
            [backend]
            base_url = "http://127.0.0.1:5000"
            "#,
        )
        .expect("should parse");
        unsafe { env::remove_var(ENV_BACKEND_URL) };

        assert_eq!(config.backend_url, "http://10.0.0.7:9000");
    }
}
