// # IP Source Trait
//
// Defines the interface for looking up the current public IPv4 address.
//
// ## Implementations
//
// - HTTP plain-text lookup services: `ddns-ip-http` crate
//
// Sources are combined into a primary/fallback pair by
// [`IpResolver`](crate::IpResolver).

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// A source performs a single lookup per call. It must not retry, cache or
/// fall back on its own; failures are reported and the resolver decides.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Look up the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: a syntactically valid IPv4 address
    /// - `Err(Error)`: transport failure, bad status, or a non-IPv4 answer
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Name of the source (for logging)
    fn source_name(&self) -> &str;
}
