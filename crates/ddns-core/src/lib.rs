// # ddns-core
//
// Core library for the websupport dynamic-DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource** / **IpResolver**: Look up the public IPv4, with one fallback source
// - **DnsProvider**: Trait for reading and writing DNS records via provider APIs
// - **Notifier** / **NotificationDispatcher**: Best-effort change notifications
// - **DdnsEngine**: Reconciles the provider's A records with the desired subdomains
// - **Runner**: Runs the engine once or on an interval until shutdown
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **No Local State**: Everything is re-read from the provider on every run
// 3. **Ownership by Tag**: Only records carrying the ownership note are edited or deleted
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod record;
pub mod tag;
pub mod resolver;
pub mod dispatch;
pub mod memory;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, Notifier};
pub use engine::{DdnsEngine, EngineEvent, ReconcileReport, RunMode, Runner};
pub use engine::runner::RunSummary;
pub use config::{DdnsConfig, NotifiersConfig};
pub use error::{Error, Result};
pub use record::{DnsRecord, NewRecord, RecordFilter, RecordId, RecordPatch, RecordType};
pub use tag::OwnershipTag;
pub use resolver::IpResolver;
pub use dispatch::NotificationDispatcher;
pub use memory::MemoryDnsProvider;
