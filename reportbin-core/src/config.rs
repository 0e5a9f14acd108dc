// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Validated once at startup; any invalid field is a ConfigError that
//! prevents the server from starting. Environment overrides are applied
//! between parsing and validation.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Port, Ttl, DEFAULT_TTL_SECS};

/// Hosted Redis REST endpoint.
pub const ENV_UPSTASH_URL: &str = "UPSTASH_REDIS_REST_URL";
/// Bearer token for the hosted Redis REST endpoint.
pub const ENV_UPSTASH_TOKEN: &str = "UPSTASH_REDIS_REST_TOKEN";
pub const ENV_PORT: &str = "REPORTBIN_PORT";
pub const ENV_TTL_SECS: &str = "REPORTBIN_TTL_SECS";

/// Raw server configuration (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServerConfig {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_max_body_bytes")]
    max_body_bytes: usize,
    #[serde(default = "default_metrics")]
    metrics: bool,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024 // 1MB
}

fn default_metrics() -> bool {
    true
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            metrics: default_metrics(),
        }
    }
}

/// Raw report settings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReportConfig {
    #[serde(default = "default_ttl_secs")]
    ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

impl Default for RawReportConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Raw store settings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStoreConfig {
    #[serde(default = "default_backend")]
    backend: String,
    url: Option<String>,
    token: Option<String>,
    #[serde(default = "default_sweep_interval_secs")]
    sweep_interval_secs: u64,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for RawStoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            token: None,
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    server: RawServerConfig,
    #[serde(default)]
    reports: RawReportConfig,
    #[serde(default)]
    store: RawStoreConfig,
}

/// Validated HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: Port,
    pub max_body_bytes: usize,
    pub metrics: bool,
}

/// Validated report configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub ttl: Ttl,
}

/// Which key-value backend holds the reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process map, lost on restart.
    Memory { sweep_interval: Duration },
    /// Hosted Redis reached over its REST API.
    Upstash { url: String, token: String },
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::Upstash { .. } => "upstash",
        }
    }
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub reports: ReportConfig,
    pub store: StoreBackend,
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file, applying process
    /// environment overrides.
    pub fn load_file(path: impl AsRef<Path>) -> ConfigResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string, applying process
    /// environment overrides.
    pub fn load_string(content: &str) -> ConfigResult<Config> {
        Self::load_string_with_env(content, |key| std::env::var(key).ok())
    }

    /// Defaults plus process environment overrides, for running without a file.
    pub fn from_env() -> ConfigResult<Config> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults plus overrides looked up through `env`.
    pub fn from_env_with<F>(env: F) -> ConfigResult<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawConfig::default();
        Self::apply_env(&mut raw, &env)?;
        Self::validate(raw)
    }

    /// Parse `content`, then apply overrides looked up through `env`.
    pub fn load_string_with_env<F>(content: &str, env: F) -> ConfigResult<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An empty document means "all defaults"
        let mut raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Self::apply_env(&mut raw, &env)?;
        Self::validate(raw)
    }

    fn apply_env<F>(raw: &mut RawConfig, env: &F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let (Some(url), Some(token)) = (env(ENV_UPSTASH_URL), env(ENV_UPSTASH_TOKEN)) {
            raw.store.backend = "upstash".to_string();
            raw.store.url = Some(url);
            raw.store.token = Some(token);
        }

        if let Some(port) = env(ENV_PORT) {
            raw.server.port = port.parse().map_err(|_| ConfigError::InvalidFieldValue {
                field: "port",
                value: port.clone(),
                reason: format!("{} must be a port number", ENV_PORT),
            })?;
        }

        if let Some(ttl) = env(ENV_TTL_SECS) {
            raw.reports.ttl_secs = ttl.parse().map_err(|_| ConfigError::InvalidFieldValue {
                field: "ttl_secs",
                value: ttl.clone(),
                reason: format!("{} must be a whole number of seconds", ENV_TTL_SECS),
            })?;
        }

        Ok(())
    }

    fn validate(raw: RawConfig) -> ConfigResult<Config> {
        Ok(Config {
            server: Self::validate_server(raw.server)?,
            reports: ReportConfig {
                ttl: Ttl::from_secs(raw.reports.ttl_secs)?,
            },
            store: Self::validate_store(raw.store)?,
        })
    }

    fn validate_server(raw: RawServerConfig) -> ConfigResult<ServerConfig> {
        // Request bodies: min 1KB, max 64MB
        const MIN_BODY: usize = 1024;
        const MAX_BODY: usize = 64 * 1024 * 1024;

        let bind = raw
            .bind
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidFieldValue {
                field: "bind",
                value: raw.bind.clone(),
                reason: e.to_string(),
            })?;

        if !(MIN_BODY..=MAX_BODY).contains(&raw.max_body_bytes) {
            return Err(ConfigError::InvalidFieldValue {
                field: "max_body_bytes",
                value: raw.max_body_bytes.to_string(),
                reason: format!("Must be between {} and {} bytes", MIN_BODY, MAX_BODY),
            });
        }

        Ok(ServerConfig {
            bind,
            port: Port::new(raw.port)?,
            max_body_bytes: raw.max_body_bytes,
            metrics: raw.metrics,
        })
    }

    fn validate_store(raw: RawStoreConfig) -> ConfigResult<StoreBackend> {
        match raw.backend.as_str() {
            "memory" => {
                if raw.sweep_interval_secs == 0 {
                    return Err(ConfigError::InvalidFieldValue {
                        field: "sweep_interval_secs",
                        value: "0".to_string(),
                        reason: "Sweep interval must be greater than 0".to_string(),
                    });
                }
                Ok(StoreBackend::Memory {
                    sweep_interval: Duration::from_secs(raw.sweep_interval_secs),
                })
            }
            "upstash" => {
                let url = raw
                    .url
                    .filter(|u| !u.is_empty())
                    .ok_or(ConfigError::MissingRequiredField {
                        field: "url",
                        context: "store (backend: upstash)",
                    })?;
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(ConfigError::InvalidFieldValue {
                        field: "url",
                        value: url,
                        reason: "Must be an http(s) URL".to_string(),
                    });
                }
                let token = raw
                    .token
                    .filter(|t| !t.is_empty())
                    .ok_or(ConfigError::MissingRequiredField {
                        field: "token",
                        context: "store (backend: upstash)",
                    })?;
                Ok(StoreBackend::Upstash {
                    url: url.trim_end_matches('/').to_string(),
                    token,
                })
            }
            other => Err(ConfigError::InvalidFieldValue {
                field: "backend",
                value: other.to_string(),
                reason: "Expected 'memory' or 'upstash'".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn load(yaml: &str) -> ConfigResult<Config> {
        ConfigLoader::load_string_with_env(yaml, no_env)
    }

    const VALID_CONFIG: &str = r#"
server:
  bind: 127.0.0.1
  port: 8080
  max_body_bytes: 2097152
  metrics: false

reports:
  ttl_secs: 3600

store:
  backend: upstash
  url: https://eu1-example.upstash.io/
  token: secret-token
"#;

    #[test]
    fn test_valid_config() {
        let config = load(VALID_CONFIG).unwrap();
        assert_eq!(config.server.port.value(), 8080);
        assert_eq!(config.server.bind.to_string(), "127.0.0.1");
        assert!(!config.server.metrics);
        assert_eq!(config.reports.ttl.secs(), 3600);
        assert_eq!(
            config.store,
            StoreBackend::Upstash {
                url: "https://eu1-example.upstash.io".to_string(),
                token: "secret-token".to_string(),
            }
        );
    }

    #[test]
    fn test_defaults_applied() {
        let config = load("").unwrap();
        assert_eq!(config.server.port.value(), 3000);
        assert_eq!(config.server.max_body_bytes, 1024 * 1024);
        assert!(config.server.metrics);
        assert_eq!(config.reports.ttl.secs(), 10_800);
        assert_eq!(
            config.store,
            StoreBackend::Memory {
                sweep_interval: Duration::from_secs(60)
            }
        );
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = load("reports:\n  ttl_secs: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidFieldValue { field: "ttl_secs", .. })
        ));
    }

    #[test]
    fn test_invalid_port_zero() {
        assert!(load("server:\n  port: 0\n").is_err());
    }

    #[test]
    fn test_invalid_bind_address() {
        assert!(load("server:\n  bind: not-an-ip\n").is_err());
    }

    #[test]
    fn test_body_limit_bounds() {
        assert!(load("server:\n  max_body_bytes: 10\n").is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let result = load("store:\n  backend: postgres\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidFieldValue { field: "backend", .. })
        ));
    }

    #[test]
    fn test_upstash_requires_token() {
        let yaml = r#"
store:
  backend: upstash
  url: https://example.upstash.io
"#;
        assert!(matches!(
            load(yaml),
            Err(ConfigError::MissingRequiredField { field: "token", .. })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(load("server:\n  prot: 8080\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_UPSTASH_URL, "https://env.upstash.io"),
            (ENV_UPSTASH_TOKEN, "env-token"),
            (ENV_PORT, "9000"),
            (ENV_TTL_SECS, "60"),
        ]
        .into_iter()
        .collect();

        let config =
            ConfigLoader::load_string_with_env("", |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.server.port.value(), 9000);
        assert_eq!(config.reports.ttl.secs(), 60);
        assert_eq!(config.store.name(), "upstash");
    }

    #[test]
    fn test_env_needs_both_upstash_vars() {
        let config = ConfigLoader::from_env_with(|k| {
            (k == ENV_UPSTASH_URL).then(|| "https://env.upstash.io".to_string())
        })
        .unwrap();
        assert_eq!(config.store.name(), "memory");
    }

    #[test]
    fn test_env_bad_ttl() {
        let result = ConfigLoader::from_env_with(|k| (k == ENV_TTL_SECS).then(|| "soon".to_string()));
        assert!(result.is_err());
    }
}
