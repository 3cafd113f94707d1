// # HTTP IP Source
//
// This crate provides plain-text "what is my IP" lookups for the DDNS system.
//
// ## Purpose
//
// The updater asks an external service for its public IPv4 address once per
// reconciliation cycle. Two services are configured: a primary
// (api.ipify.org by default) and a fallback (checkip.amazonaws.com).
//
// ## Architecture
//
// Each service is one `HttpIpSource`. Nothing is cached; every call to
// `current()` issues one GET. Fallback ordering is handled by
// `ddns_core::IpResolver`, not here.

use ddns_core::config::IpLookupConfig;
use ddns_core::traits::IpSource;
use ddns_core::{Error, IpResolver, Result};

use std::net::Ipv4Addr;
use std::time::Duration;

use tracing::debug;

/// A single plain-text IP lookup service
pub struct HttpIpSource {
    /// Label used in log lines (the service host)
    name: String,

    /// URL returning the caller's address as the response body
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    /// - `timeout`: per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let parsed = reqwest::Url::parse(&url)
            .map_err(|e| Error::config(format!("Invalid IP lookup URL '{}': {}", url, e)))?;
        let name = parsed.host_str().unwrap_or("ip lookup").to_string();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { name, url, client })
    }

    /// Override the name shown in log lines
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", self.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(format!("{} answered {}", self.name, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        parse_ipv4(&body)
    }
}

/// Parse a lookup response body as a dotted-quad IPv4 address
///
/// Surrounding whitespace (the trailing newline most services send) is
/// ignored. Anything else, including IPv6 addresses, is rejected.
pub fn parse_ipv4(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();
    text.parse::<Ipv4Addr>()
        .map_err(|_| Error::invalid_input(format!("Invalid IPv4 address: {:?}", text)))
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        debug!("Requesting public IP from {}", self.url);
        self.fetch_ip().await
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Build the primary/fallback resolver from configuration
pub fn resolver_from_config(config: &IpLookupConfig) -> Result<IpResolver> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let primary = HttpIpSource::new(&config.primary_url, timeout)?;
    let fallback = HttpIpSource::new(&config.fallback_url, timeout)?;
    Ok(IpResolver::new(Box::new(primary), Box::new(fallback)))
}
