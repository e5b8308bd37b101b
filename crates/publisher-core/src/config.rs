//! PublisherConfig - 起動時に一度だけ組み立てる設定
//!
//! 各コンポーネントは `Arc<PublisherConfig>` を受け取り、グローバル状態は持ちません。

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}={value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Store endpoint for task queries. Env: `MU_SPARQL_ENDPOINT`.
    pub sparql_endpoint: String,
    /// Store endpoint for bulk writes. Env: `HIGH_LOAD_DATABASE_ENDPOINT`.
    pub high_load_endpoint: String,
    /// Graph receiving published triples. Env: `TARGET_GRAPH`.
    pub target_graph: String,
    /// File enumeration page size. Env: `DCR_BATCH_SIZE`, default 100.
    pub page_size: usize,
    /// Write request ceiling in bytes. Env: `HTTP_MAX_QUERY_SIZE_BYTES`, default 60000.
    pub max_query_bytes: usize,
    /// Mount point of `share://` locators. Env: `SHARE_ROOT`, default `/share`.
    pub share_root: PathBuf,
    /// Env: `DB_PROBE_ATTEMPTS`, default 30.
    pub probe_attempts: u32,
    /// Env: `DB_PROBE_INTERVAL_MS`, default 2000.
    pub probe_interval: Duration,
    /// Env: `SPARQL_TIMEOUT_SECS`, default 300.
    pub request_timeout: Duration,
    /// Delay before the transport's single retry. Env: `SPARQL_RETRY_DELAY_MS`, default 1000.
    pub retry_delay: Duration,
}

const DEFAULT_ENDPOINT: &str = "http://database:8890/sparql";

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            sparql_endpoint: DEFAULT_ENDPOINT.to_string(),
            high_load_endpoint: DEFAULT_ENDPOINT.to_string(),
            target_graph: "http://mu.semte.ch/graphs/public".to_string(),
            page_size: 100,
            max_query_bytes: 60_000,
            share_root: PathBuf::from("/share"),
            probe_attempts: 30,
            probe_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(300),
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl PublisherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests use a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let text = |name: &str, default: String| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default)
        };

        let sparql_endpoint = text("MU_SPARQL_ENDPOINT", defaults.sparql_endpoint);
        Ok(Self {
            high_load_endpoint: text("HIGH_LOAD_DATABASE_ENDPOINT", sparql_endpoint.clone()),
            sparql_endpoint,
            target_graph: text("TARGET_GRAPH", defaults.target_graph),
            page_size: parse_positive(&lookup, "DCR_BATCH_SIZE", defaults.page_size as u64)?
                as usize,
            max_query_bytes: parse_positive(
                &lookup,
                "HTTP_MAX_QUERY_SIZE_BYTES",
                defaults.max_query_bytes as u64,
            )? as usize,
            share_root: lookup("SHARE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.share_root),
            probe_attempts: parse_positive(
                &lookup,
                "DB_PROBE_ATTEMPTS",
                defaults.probe_attempts.into(),
            )? as u32,
            probe_interval: Duration::from_millis(parse_positive(
                &lookup,
                "DB_PROBE_INTERVAL_MS",
                defaults.probe_interval.as_millis() as u64,
            )?),
            request_timeout: Duration::from_secs(parse_positive(
                &lookup,
                "SPARQL_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            retry_delay: Duration::from_millis(parse_positive(
                &lookup,
                "SPARQL_RETRY_DELAY_MS",
                defaults.retry_delay.as_millis() as u64,
            )?),
        })
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let value = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        name,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if value == 0 || value > u32::MAX as u64 {
        return Err(ConfigError::Invalid {
            name,
            value: raw,
            reason: "must be between 1 and 4294967295".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<PublisherConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PublisherConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, PublisherConfig::default());
        assert_eq!(config.max_query_bytes, 60_000);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.probe_attempts, 30);
        assert_eq!(config.probe_interval, Duration::from_secs(2));
    }

    #[test]
    fn high_load_endpoint_follows_store_endpoint() {
        let config = load(&[("MU_SPARQL_ENDPOINT", "http://virtuoso:8890/sparql")]).unwrap();
        assert_eq!(config.high_load_endpoint, "http://virtuoso:8890/sparql");

        let config = load(&[
            ("MU_SPARQL_ENDPOINT", "http://auth/sparql"),
            ("HIGH_LOAD_DATABASE_ENDPOINT", "http://virtuoso:8890/sparql"),
        ])
        .unwrap();
        assert_eq!(config.sparql_endpoint, "http://auth/sparql");
        assert_eq!(config.high_load_endpoint, "http://virtuoso:8890/sparql");
    }

    #[test]
    fn numeric_overrides() {
        let config = load(&[
            ("DCR_BATCH_SIZE", "250"),
            ("HTTP_MAX_QUERY_SIZE_BYTES", "1024"),
            ("DB_PROBE_INTERVAL_MS", "10"),
            ("SHARE_ROOT", "/tmp/share"),
        ])
        .unwrap();
        assert_eq!(config.page_size, 250);
        assert_eq!(config.max_query_bytes, 1024);
        assert_eq!(config.probe_interval, Duration::from_millis(10));
        assert_eq!(config.share_root, PathBuf::from("/tmp/share"));
    }

    #[test]
    fn rejects_malformed_and_zero_numbers() {
        assert!(matches!(
            load(&[("DCR_BATCH_SIZE", "lots")]),
            Err(ConfigError::Invalid { name: "DCR_BATCH_SIZE", .. })
        ));
        assert!(matches!(
            load(&[("HTTP_MAX_QUERY_SIZE_BYTES", "0")]),
            Err(ConfigError::Invalid { name: "HTTP_MAX_QUERY_SIZE_BYTES", .. })
        ));
    }
}
