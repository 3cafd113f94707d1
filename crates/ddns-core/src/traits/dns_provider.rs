// # DNS Provider Trait
//
// Defines the interface the engine uses to read and write DNS records.
//
// ## Implementations
//
// - Websupport: `ddns-provider-websupport` crate
// - In-memory: `ddns_core::memory::MemoryDnsProvider` (tests)
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
// use ddns_core::record::{RecordFilter, RecordType};
//
// let owned = provider
//     .list_records(&RecordFilter::new().with_type(RecordType::A).with_note("websupportsk-ddns"))
//     .await?;
// ```

use async_trait::async_trait;

use crate::record::{DnsRecord, NewRecord, RecordFilter, RecordId, RecordPatch};

/// Trait for DNS provider implementations
///
/// Providers are thin gateways: one API call per method, no retries, no
/// caching, no decisions about what should change. All of that is owned by
/// [`DdnsEngine`](crate::DdnsEngine).
///
/// # Filter semantics
///
/// `list_records` must return exactly the records for which
/// [`RecordFilter::matches`] is true, in the provider's listing order. The
/// engine relies on that order for its first-match-wins policy.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Check that the credentials work and the managed domain is reachable
    ///
    /// Called once before the first reconciliation. Implementations should
    /// return [`Error::Authentication`](crate::Error::Authentication) for bad
    /// credentials and [`Error::DomainAccess`](crate::Error::DomainAccess) when
    /// the domain cannot be accessed.
    async fn verify_access(&self) -> Result<(), crate::Error> {
        Ok(())
    }

    /// List records matching the filter
    async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record and return it as stored by the provider
    async fn create_record(&self, record: &NewRecord) -> Result<DnsRecord, crate::Error>;

    /// Change the present fields of an existing record
    async fn edit_record(
        &self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> Result<DnsRecord, crate::Error>;

    /// Delete a record
    async fn delete_record(&self, id: RecordId) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
