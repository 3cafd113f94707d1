// # Memory DNS Provider
//
// In-memory implementation of DnsProvider.
//
// ## Purpose
//
// Holds a zone in a Vec and applies the same filter semantics as a real
// provider. Useful for testing the engine and for embedding the engine
// without network access.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::record::{DnsRecord, NewRecord, RecordFilter, RecordId, RecordPatch};
use crate::traits::DnsProvider;

#[derive(Debug, Default)]
struct Zone {
    records: Vec<DnsRecord>,
    next_id: RecordId,
}

/// In-memory DNS provider
///
/// Clones share the same zone, so a test can keep a handle and inspect the
/// records after handing a clone to the engine.
///
/// # Example
///
/// ```rust
/// use ddns_core::memory::MemoryDnsProvider;
/// use ddns_core::record::{NewRecord, RecordFilter};
/// use ddns_core::traits::DnsProvider;
///
/// # tokio_test::block_on(async {
/// let provider = MemoryDnsProvider::new();
/// provider.create_record(&NewRecord::a("home", "1.2.3.4", "websupportsk-ddns")).await.unwrap();
///
/// let all = provider.list_records(&RecordFilter::new()).await.unwrap();
/// assert_eq!(all.len(), 1);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDnsProvider {
    inner: Arc<RwLock<Zone>>,
}

impl MemoryDnsProvider {
    /// Create a provider with an empty zone
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider pre-populated with records
    ///
    /// Newly created records get ids above the highest existing one.
    pub fn with_records(records: Vec<DnsRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(RwLock::new(Zone { records, next_id })),
        }
    }

    /// Copy of every record in the zone, in listing order
    pub async fn snapshot(&self) -> Vec<DnsRecord> {
        self.inner.read().await.records.clone()
    }

    /// Get the number of records in the zone
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Check if the zone is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

#[async_trait]
impl DnsProvider for MemoryDnsProvider {
    async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<DnsRecord>, Error> {
        let zone = self.inner.read().await;
        Ok(zone
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn create_record(&self, record: &NewRecord) -> Result<DnsRecord, Error> {
        let mut zone = self.inner.write().await;
        let id = zone.next_id.max(1);
        zone.next_id = id + 1;

        let created = DnsRecord {
            id,
            record_type: record.record_type.clone(),
            name: record.name.clone(),
            content: record.content.clone(),
            note: record.note.clone(),
            ttl: record.ttl,
        };
        zone.records.push(created.clone());
        Ok(created)
    }

    async fn edit_record(&self, id: RecordId, patch: &RecordPatch) -> Result<DnsRecord, Error> {
        let mut zone = self.inner.write().await;
        let record = zone
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::provider("memory", format!("record {} not found", id)))?;
        patch.apply_to(record);
        Ok(record.clone())
    }

    async fn delete_record(&self, id: RecordId) -> Result<(), Error> {
        let mut zone = self.inner.write().await;
        let before = zone.records.len();
        zone.records.retain(|r| r.id != id);
        if zone.records.len() == before {
            return Err(Error::provider("memory", format!("record {} not found", id)));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
