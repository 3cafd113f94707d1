//! Configuration types for the DDNS system
//!
//! The configuration is a JSON document. Only the `websupport` block is
//! required; every other block falls back to its defaults.

use crate::error::{Error, Result};
use crate::tag::OwnershipTag;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default primary IP lookup service
pub const DEFAULT_PRIMARY_IP_URL: &str = "https://api.ipify.org";

/// Default fallback IP lookup service
pub const DEFAULT_FALLBACK_IP_URL: &str = "https://checkip.amazonaws.com/";

/// Default Websupport REST API endpoint
pub const DEFAULT_WEBSUPPORT_API_URL: &str = "https://rest.websupport.sk";

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Provider account, domain and desired subdomains
    pub websupport: WebsupportConfig,

    /// IP lookup services
    #[serde(default)]
    pub ip_lookup: IpLookupConfig,

    /// Optional notification channels
    #[serde(default)]
    pub notifiers: NotifiersConfig,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DdnsConfig {
    /// Parse a configuration document
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.websupport.validate()?;
        self.ip_lookup.validate()?;
        self.notifiers.validate()?;
        self.engine.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// The ownership tag for this configuration
    pub fn ownership_tag(&self) -> OwnershipTag {
        OwnershipTag::new(self.websupport.ddns_id.as_deref())
    }
}

/// Websupport account and zone configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsupportConfig {
    /// API credentials
    pub authentication: Authentication,

    /// The managed domain (zone), e.g. "example.com"
    pub registered_domain: String,

    /// Subdomain labels that should point at the current IP, in order
    pub subdomains: Vec<String>,

    /// Optional suffix appended to the ownership tag
    #[serde(default)]
    pub ddns_id: Option<String>,

    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout for each API request (in seconds)
    #[serde(default = "default_provider_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl WebsupportConfig {
    fn validate(&self) -> Result<()> {
        if self.authentication.identifier.is_empty() {
            return Err(Error::config("websupport.authentication.identifier cannot be empty"));
        }
        if self.authentication.secret_key.is_empty() {
            return Err(Error::config("websupport.authentication.secret_key cannot be empty"));
        }
        if self.registered_domain.trim().is_empty() {
            return Err(Error::config("websupport.registered_domain cannot be empty"));
        }
        if self.subdomains.is_empty() {
            return Err(Error::config("websupport.subdomains must contain at least one entry"));
        }
        if let Some(empty) = self.subdomains.iter().position(|s| s.trim().is_empty()) {
            return Err(Error::config(format!(
                "websupport.subdomains[{}] cannot be empty",
                empty
            )));
        }
        if !self.api_url.starts_with("https://") && !self.api_url.starts_with("http://") {
            return Err(Error::config(format!(
                "websupport.api_url must use HTTP or HTTPS scheme. Got: {}",
                self.api_url
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(Error::config("websupport.http_timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// API credentials
///
/// The Debug implementation never prints the secret.
#[derive(Clone, Serialize, Deserialize)]
pub struct Authentication {
    /// API key identifier
    pub identifier: String,
    /// API secret used for request signing
    pub secret_key: String,
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authentication")
            .field("identifier", &self.identifier)
            .field("secret_key", &"<REDACTED>")
            .finish()
    }
}

/// IP lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpLookupConfig {
    /// Service asked first
    #[serde(default = "default_primary_ip_url")]
    pub primary_url: String,

    /// Service asked once when the primary fails
    #[serde(default = "default_fallback_ip_url")]
    pub fallback_url: String,

    /// Request timeout (in seconds)
    #[serde(default = "default_ip_timeout_secs")]
    pub timeout_secs: u64,
}

impl IpLookupConfig {
    fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("ip_lookup.primary_url", &self.primary_url),
            ("ip_lookup.fallback_url", &self.fallback_url),
        ] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(Error::config(format!(
                    "{} must use HTTP or HTTPS scheme. Got: {}",
                    key, url
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("ip_lookup.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

impl Default for IpLookupConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_ip_url(),
            fallback_url: default_fallback_ip_url(),
            timeout_secs: default_ip_timeout_secs(),
        }
    }
}

/// Notification channels; each one is enabled by being present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifiersConfig {
    #[serde(default)]
    pub pushover: Option<PushoverConfig>,

    #[serde(default)]
    pub gotify: Option<GotifyConfig>,

    /// Timeout for each delivery (in seconds)
    #[serde(default = "default_notify_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifiersConfig {
    fn default() -> Self {
        Self {
            pushover: None,
            gotify: None,
            timeout_secs: default_notify_timeout_secs(),
        }
    }
}

impl NotifiersConfig {
    fn validate(&self) -> Result<()> {
        if let Some(pushover) = &self.pushover
            && (pushover.api_token.is_empty() || pushover.user_key.is_empty())
        {
            return Err(Error::config("notifiers.pushover needs api_token and user_key"));
        }
        if let Some(gotify) = &self.gotify
            && (gotify.url.trim().is_empty() || gotify.api_token.is_empty())
        {
            return Err(Error::config("notifiers.gotify needs url and api_token"));
        }
        if !self.is_empty() && self.timeout_secs == 0 {
            return Err(Error::config("notifiers.timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Number of configured channels
    pub fn len(&self) -> usize {
        usize::from(self.pushover.is_some()) + usize::from(self.gotify.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pushover channel
#[derive(Clone, Serialize, Deserialize)]
pub struct PushoverConfig {
    pub api_token: String,
    pub user_key: String,
}

impl fmt::Debug for PushoverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushoverConfig")
            .field("api_token", &"<REDACTED>")
            .field("user_key", &"<REDACTED>")
            .finish()
    }
}

/// Gotify channel
#[derive(Clone, Serialize, Deserialize)]
pub struct GotifyConfig {
    /// Server address, "host[:port]"; plain HTTP is assumed without a scheme
    pub url: String,
    pub api_token: String,
}

impl fmt::Debug for GotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GotifyConfig")
            .field("url", &self.url)
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interval between cycles in repeat mode (in seconds)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// TTL of records created by the engine (in seconds)
    #[serde(default = "default_record_ttl")]
    pub record_ttl: u32,
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(Error::config("engine.interval_secs must be > 0"));
        }
        if self.record_ttl == 0 {
            return Err(Error::config("engine.record_ttl must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            record_ttl: default_record_ttl(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also append log lines to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(Error::config(format!(
                "logging.level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                self.level
            ))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_primary_ip_url() -> String {
    DEFAULT_PRIMARY_IP_URL.to_string()
}

fn default_fallback_ip_url() -> String {
    DEFAULT_FALLBACK_IP_URL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_WEBSUPPORT_API_URL.to_string()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_ip_timeout_secs() -> u64 {
    10
}

fn default_notify_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    300
}

fn default_record_ttl() -> u32 {
    crate::record::DEFAULT_TTL
}

fn default_log_level() -> String {
    "info".to_string()
}
