//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Look up the current public IPv4 address
//! - [`DnsProvider`]: Read and write DNS records via the provider API
//! - [`Notifier`]: Deliver change notifications

pub mod ip_source;
pub mod dns_provider;
pub mod notifier;

pub use ip_source::IpSource;
pub use dns_provider::DnsProvider;
pub use notifier::Notifier;
