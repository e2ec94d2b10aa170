//! Controller configuration
//!
//! Settings are read from the process environment (optionally seeded from a
//! `.env` file by the binary). Every setting has a default so the MCP server
//! can start and list its tools before a controller is reachable.

use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use std::time::Duration;
use url::Url;

/// Default HTTPS port of a UniFi controller
pub const DEFAULT_PORT: u16 = 443;

/// Default site identifier
pub const DEFAULT_SITE: &str = "default";

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for one UniFi controller
#[derive(Clone)]
pub struct UnifiConfig {
    /// Controller host name or IP address
    pub host: String,
    /// Login user name
    pub username: String,
    /// Login password
    pub password: String,
    /// Controller HTTPS port
    pub port: u16,
    /// Verify the controller's TLS certificate
    pub verify_ssl: bool,
    /// Site used when a tool call does not name one
    pub site: String,
    /// API key (reserved, not used by the login protocol)
    pub api_key: Option<String>,
    /// Transport connect/response timeout
    pub timeout: Duration,
    /// Full base URL override, e.g. `http://127.0.0.1:8443`
    pub base_url: Option<String>,
    /// Request budget per rolling window
    pub rate_limit: RateLimiterConfig,
}

impl Default for UnifiConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            username: "admin".to_string(),
            password: String::new(),
            port: DEFAULT_PORT,
            verify_ssl: false,
            site: DEFAULT_SITE.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: None,
            rate_limit: RateLimiterConfig::default(),
        }
    }
}

impl std::fmt::Debug for UnifiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("verify_ssl", &self.verify_ssl)
            .field("site", &self.site)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl UnifiConfig {
    /// Create a new config builder
    pub fn builder() -> UnifiConfigBuilder {
        UnifiConfigBuilder::default()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = get("UNIFI_HOST")
            .or_else(|| get("UNIFI_ROUTER_IP"))
            .unwrap_or(defaults.host);

        let port = match get("UNIFI_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::invalid_value("UNIFI_PORT", format!("{raw}: {e}")))?,
            None => defaults.port,
        };

        let timeout = match get("UNIFI_API_TIMEOUT") {
            Some(raw) => Duration::from_secs(parse_u64("UNIFI_API_TIMEOUT", &raw)?),
            None => defaults.timeout,
        };

        let mut rate_limit = defaults.rate_limit;
        if let Some(raw) = get("UNIFI_RATE_LIMIT_MAX_REQUESTS") {
            rate_limit.max_requests = parse_u64("UNIFI_RATE_LIMIT_MAX_REQUESTS", &raw)? as usize;
        }
        if let Some(raw) = get("UNIFI_RATE_LIMIT_WINDOW_MS") {
            rate_limit.time_window =
                Duration::from_millis(parse_u64("UNIFI_RATE_LIMIT_WINDOW_MS", &raw)?);
        }

        let config = Self {
            host,
            username: get("UNIFI_USERNAME").unwrap_or(defaults.username),
            password: lookup("UNIFI_PASSWORD").unwrap_or_default(),
            port,
            verify_ssl: get("UNIFI_VERIFY_SSL").is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            site: get("UNIFI_SITE").unwrap_or(defaults.site),
            api_key: get("UNIFI_API_KEY"),
            timeout,
            base_url: get("UNIFI_BASE_URL"),
            rate_limit,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that cannot be defaulted away
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() && self.base_url.is_none() {
            return Err(Error::missing_field("UNIFI_HOST"));
        }
        if self.username.trim().is_empty() {
            return Err(Error::missing_field("UNIFI_USERNAME"));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(Error::invalid_value(
                "UNIFI_RATE_LIMIT_MAX_REQUESTS",
                "must be at least 1",
            ));
        }
        self.base_url().map(|_| ())
    }

    /// Root URL of the controller (`https://host:port` unless overridden)
    pub fn base_url(&self) -> Result<Url> {
        let raw = match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}:{}", self.host, self.port),
        };
        Ok(Url::parse(&raw)?)
    }
}

fn parse_u64(field: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| Error::invalid_value(field, format!("{raw}: {e}")))
}

/// Builder for controller config
#[derive(Default)]
pub struct UnifiConfigBuilder {
    config: UnifiConfig,
}

impl UnifiConfigBuilder {
    /// Set the controller host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the login credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.password = password.into();
        self
    }

    /// Set the controller port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable or disable TLS certificate verification
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.config.verify_ssl = verify;
        self
    }

    /// Set the default site
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.config.site = site.into();
        self
    }

    /// Set the transport timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Override the controller base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the rate limit budget
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = config;
        self
    }

    /// Build the config
    pub fn build(self) -> UnifiConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = UnifiConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "");
        assert_eq!(config.port, 443);
        assert!(!config.verify_ssl);
        assert_eq!(config.site, "default");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.time_window, Duration::from_millis(60_000));
        assert_eq!(config.base_url().unwrap().as_str(), "https://localhost/");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = UnifiConfig::from_lookup(lookup_from(&[
            ("UNIFI_HOST", "10.0.0.1"),
            ("UNIFI_USERNAME", "ops"),
            ("UNIFI_PASSWORD", "s3cret"),
            ("UNIFI_PORT", "8443"),
            ("UNIFI_VERIFY_SSL", "TRUE"),
            ("UNIFI_SITE", "branch"),
            ("UNIFI_API_KEY", "key-1"),
            ("UNIFI_API_TIMEOUT", "5"),
            ("UNIFI_RATE_LIMIT_MAX_REQUESTS", "10"),
            ("UNIFI_RATE_LIMIT_WINDOW_MS", "1000"),
        ]))
        .unwrap();

        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.username, "ops");
        assert_eq!(config.password, "s3cret");
        assert_eq!(config.port, 8443);
        assert!(config.verify_ssl);
        assert_eq!(config.site, "branch");
        assert_eq!(config.api_key.as_deref(), Some("key-1"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.time_window, Duration::from_secs(1));
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://10.0.0.1:8443/"
        );
    }

    #[test]
    fn test_router_ip_fallback() {
        let config =
            UnifiConfig::from_lookup(lookup_from(&[("UNIFI_ROUTER_IP", "192.168.1.1")])).unwrap();
        assert_eq!(config.host, "192.168.1.1");
    }

    #[test]
    fn test_verify_ssl_only_true_enables() {
        let config =
            UnifiConfig::from_lookup(lookup_from(&[("UNIFI_VERIFY_SSL", "yes")])).unwrap();
        assert!(!config.verify_ssl);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = UnifiConfig::from_lookup(lookup_from(&[("UNIFI_PORT", "https")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "UNIFI_PORT"));
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        let err = UnifiConfig::from_lookup(lookup_from(&[("UNIFI_RATE_LIMIT_MAX_REQUESTS", "0")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_base_url_override() {
        let config = UnifiConfig::builder()
            .base_url("http://127.0.0.1:9000")
            .build();
        assert_eq!(config.base_url().unwrap().as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = UnifiConfig::builder()
            .credentials("admin", "hunter2")
            .build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
