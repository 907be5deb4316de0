//! Configuration management

use std::{env, path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DASHMETRICS_";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before resolving credentials.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    pub env_files: Vec<String>,
    /// Server configuration
    pub server: ServerConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Upstream provider configuration
    pub providers: ProvidersConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// Graceful shutdown timeout
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_body_size: 1024 * 1024,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allow requests from any origin with any method and header
    pub allow_any_origin: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
        }
    }
}

/// The three upstream providers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Liquidity-pool / market-data API
    pub pools: ProviderConfig,
    /// Token-launch analytics API
    pub launch: ProviderConfig,
    /// Token-metrics / AI grading API
    pub metrics: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            pools: ProviderConfig::new("https://api.geckoterminal.com/api/v2", None),
            launch: ProviderConfig::new("https://streaming.bitquery.io/eap", None),
            metrics: ProviderConfig::new(
                "https://api.tokenmetrics.com/v2",
                Some("env:TOKEN_METRICS_API_KEY"),
            ),
        }
    }
}

/// Connection settings for one upstream provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Credential reference: literal, `env:VAR` or `{env.VAR}`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl ProviderConfig {
    fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            timeout: default_timeout(),
        }
    }

    /// Resolve the credential reference to its value.
    ///
    /// Returns `Ok(None)` when no credential is configured. The error
    /// message names the variable but never the value.
    pub fn resolve_api_key(&self) -> Result<Option<String>> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let var_name = if let Some(name) = key.strip_prefix("env:") {
            Some(name)
        } else if key.starts_with("{env.") && key.ends_with('}') {
            Some(&key[5..key.len() - 1])
        } else {
            None
        };

        match var_name {
            Some(name) => match env::var(name) {
                Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
                _ => Err(Error::Config(format!(
                    "Environment variable '{name}' not set"
                ))),
            },
            None if key.trim().is_empty() => Ok(None),
            None => Ok(Some(key.to_string())),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional YAML file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // DASHMETRICS_PROVIDERS__METRICS__BASE_URL -> providers.metrics.base_url
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.load_env_files();
        config.expand_env_vars();

        Ok(config)
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => tracing::info!("Loaded env file: {expanded}"),
                    Err(e) => tracing::warn!("Failed to load env file {expanded}: {e}"),
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }

    /// Expand ${VAR} and ${VAR:-default} patterns in provider base URLs
    fn expand_env_vars(&mut self) {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
            .expect("static pattern is valid");

        for provider in [
            &mut self.providers.pools,
            &mut self.providers.launch,
            &mut self.providers.metrics,
        ] {
            provider.base_url = Self::expand_string(&re, &provider.base_url);
        }
    }

    fn expand_string(re: &Regex, value: &str) -> String {
        re.replace_all(value, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default = caps.get(2).map_or("", |m| m.as_str());
            env::var(var_name).unwrap_or_else(|_| default.to_string())
        })
        .into_owned()
    }

    /// Copy with every credential replaced by a marker, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for provider in [
            &mut copy.providers.pools,
            &mut copy.providers.launch,
            &mut copy.providers.metrics,
        ] {
            if let Some(key) = provider.api_key.as_mut() {
                if !key.starts_with("env:") && !key.starts_with("{env.") {
                    *key = "<redacted>".to_string();
                }
            }
        }
        copy
    }
}

/// Serde adapter for human-readable durations (`30s`, `5m`, `100ms`)
pub mod humantime_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serialize Duration to a human-readable string (e.g., "30s")
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the serializer fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    /// Deserialize a human-readable duration string
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the string cannot be parsed as a duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    fn parse(s: &str) -> Result<Duration, std::num::ParseIntError> {
        let s = s.trim();
        // "ms" must be checked before "s"
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>().map(Duration::from_millis)
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>().map(Duration::from_secs)
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.parse::<u64>().map(|m| Duration::from_secs(m * 60))
        } else {
            s.parse::<u64>().map(Duration::from_secs)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_public_providers() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(
            config.providers.metrics.api_key.as_deref(),
            Some("env:TOKEN_METRICS_API_KEY")
        );
        assert!(config.providers.pools.api_key.is_none());
        assert_eq!(config.providers.launch.timeout, Duration::from_secs(30));
    }

    #[test]
    fn load_merges_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
server:
  port: 9100
providers:
  pools:
    base_url: "http://127.0.0.1:9999"
    timeout: 5s
"#
        )
        .unwrap();
        drop(f);

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.providers.pools.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.providers.pools.timeout, Duration::from_secs(5));
        // untouched sections keep their defaults
        assert_eq!(
            config.providers.metrics.base_url,
            "https://api.tokenmetrics.com/v2"
        );
    }

    #[test]
    fn load_rejects_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/gateway.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn load_env_files_sets_env_vars() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("test.env");
        let mut f = std::fs::File::create(&env_path).unwrap();
        writeln!(f, "DASHMETRICS_TEST_ENV_FILE_KEY=from_env_file").unwrap();
        drop(f);

        let config = Config {
            env_files: vec![env_path.to_string_lossy().to_string()],
            ..Default::default()
        };
        config.load_env_files();

        assert_eq!(
            env::var("DASHMETRICS_TEST_ENV_FILE_KEY").unwrap(),
            "from_env_file"
        );
    }

    #[test]
    fn load_env_files_skips_missing() {
        let config = Config {
            env_files: vec!["/nonexistent/path/.env".to_string()],
            ..Default::default()
        };
        config.load_env_files();
    }

    #[test]
    fn resolve_literal_and_missing_keys() {
        let mut provider = ProviderConfig::new("http://x", Some("literal-key"));
        assert_eq!(provider.resolve_api_key().unwrap().as_deref(), Some("literal-key"));

        provider.api_key = None;
        assert_eq!(provider.resolve_api_key().unwrap(), None);

        provider.api_key = Some("env:DASHMETRICS_TEST_SURELY_UNSET_VAR".to_string());
        let err = provider.resolve_api_key().unwrap_err();
        assert!(err.to_string().contains("DASHMETRICS_TEST_SURELY_UNSET_VAR"));

        provider.api_key = Some("{env.DASHMETRICS_TEST_SURELY_UNSET_VAR}".to_string());
        assert!(provider.resolve_api_key().is_err());
    }

    #[test]
    fn expand_string_uses_default() {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").unwrap();
        let out = Config::expand_string(
            &re,
            "${DASHMETRICS_TEST_SURELY_UNSET_HOST:-http://localhost:1}/v2",
        );
        assert_eq!(out, "http://localhost:1/v2");
    }

    #[test]
    fn redacted_hides_literal_keys_only() {
        let mut config = Config::default();
        config.providers.pools.api_key = Some("secret-value".to_string());
        let redacted = config.redacted();
        assert_eq!(redacted.providers.pools.api_key.as_deref(), Some("<redacted>"));
        assert_eq!(
            redacted.providers.metrics.api_key.as_deref(),
            Some("env:TOKEN_METRICS_API_KEY")
        );
    }

    #[test]
    fn deserialized_from_yaml() {
        let yaml = r#"
env_files:
  - ~/.dashmetrics.env
providers:
  metrics:
    base_url: "https://api.tokenmetrics.com/v2"
    api_key: "env:TM_KEY"
    timeout: 1m
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.env_files, vec!["~/.dashmetrics.env".to_string()]);
        assert_eq!(config.providers.metrics.timeout, Duration::from_secs(60));
        assert_eq!(config.providers.metrics.api_key.as_deref(), Some("env:TM_KEY"));
    }
}
