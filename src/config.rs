//! Process configuration
//!
//! Loaded once at startup from a YAML file, e.g.:
//!
//! ```yaml
//! es_host: http://localhost:9200
//! alerts_index: alerts
//! sync_interval: 30s
//! notifiers:
//!   - type: webhook
//!     name: ops
//!     endpoint: https://hooks.example.com/x
//!     retries: 3
//!     headers:
//!       Authorization: Bearer t
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the alert store
    pub es_host: String,
    #[serde(default)]
    pub es_username: Option<String>,
    #[serde(default)]
    pub es_password: Option<String>,
    /// Index holding the raw alert documents
    pub alerts_index: String,
    /// Pause between reconciliation passes ("30s", "5m", ...)
    #[serde(with = "humantime_serde")]
    pub sync_interval: Duration,
    /// Bind address of the metrics endpoint
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
    #[serde(default)]
    pub notifiers: Vec<ChannelConfig>,
}

fn default_metrics_addr() -> String {
    "0.0.0.0:8766".to_string()
}

/// One configured notification channel; `type` selects the variant
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelConfig {
    Webhook {
        name: String,
        endpoint: String,
        retries: u32,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.es_host.is_empty() {
            return Err(ConfigError::Invalid("es_host must not be empty".to_string()));
        }
        if self.alerts_index.is_empty() {
            return Err(ConfigError::Invalid(
                "alerts_index must not be empty".to_string(),
            ));
        }

        for notifier in &self.notifiers {
            let ChannelConfig::Webhook { name, retries, .. } = notifier;
            if *retries < 1 {
                return Err(ConfigError::Invalid(format!(
                    "notifier {name}: retries must be at least 1"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
es_host: http://localhost:9200
es_username: elastic
es_password: secret
alerts_index: alerts
sync_interval: 30s
notifiers:
  - type: webhook
    name: ops
    endpoint: https://hooks.example.com/x
    retries: 3
    headers:
      Authorization: Bearer t
"#;

    #[test]
    fn test_parse_sample() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.es_host, "http://localhost:9200");
        assert_eq!(config.sync_interval, Duration::from_secs(30));
        assert_eq!(config.metrics_addr, "0.0.0.0:8766");
        assert_eq!(config.notifiers.len(), 1);

        let ChannelConfig::Webhook {
            name,
            retries,
            headers,
            ..
        } = &config.notifiers[0];
        assert_eq!(name, "ops");
        assert_eq!(*retries, 3);
        assert_eq!(headers.get("Authorization").unwrap(), "Bearer t");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.alerts_index, "alerts");
    }

    #[test]
    fn test_unknown_channel_type_rejected() {
        let raw = r#"
es_host: http://localhost:9200
alerts_index: alerts
sync_interval: 1m
notifiers:
  - type: pager
    name: oncall
"#;
        assert!(serde_yaml::from_str::<Config>(raw).is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let raw = r#"
es_host: http://localhost:9200
alerts_index: alerts
sync_interval: 1m
notifiers:
  - type: webhook
    name: ops
    endpoint: http://localhost/x
    retries: 0
"#;
        let config: Config = serde_yaml::from_str(raw).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_host_rejected() {
        let raw = r#"
es_host: ""
alerts_index: alerts
sync_interval: 1m
"#;
        let config: Config = serde_yaml::from_str(raw).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
