//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Bringing the provider's A records in line with the desired subdomains
//! - Tagging every record it manages with the ownership tag
//! - Removing owned records for subdomains that are no longer desired
//! - Notifying configured channels of every change
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ IpResolver  │─── Ipv4Addr ────────┐
//! └─────────────┘                     │
//!                                     ▼
//!                            ┌──────────────┐
//!                            │ DdnsEngine   │
//!                            └──────────────┘
//!                                     │
//!                     ┌───────────────┴───────────────┐
//!                     │                               │
//!                     ▼                               ▼
//!            ┌──────────────┐              ┌──────────────────────┐
//!            │ DnsProvider  │              │ NotificationDispatcher│
//!            │ (read/write) │              │ (on change)          │
//!            └──────────────┘              └──────────────────────┘
//! ```
//!
//! ## Reconciliation
//!
//! For every desired subdomain, three independent checks run in order:
//!
//! 1. Tag repair: an A record with the right IP but a foreign note gets the tag.
//! 2. Content drift: an owned A record with a stale IP gets the current IP.
//! 3. Creation: no owned A record for the subdomain means one is created.
//!
//! Then one cleanup pass deletes owned A records whose name is not desired.
//!
//! Every list query uses the first returned record only. Several owned
//! records for the same name are an unsupported configuration; the engine
//! will converge on the first one and leave the rest alone.
//!
//! The three checks are separate provider queries without any transaction.
//! A run is best-effort; anything it misses is fixed on the next run.

pub mod runner;

use crate::config::DdnsConfig;
use crate::dispatch::NotificationDispatcher;
use crate::error::Result;
use crate::record::{NewRecord, RecordFilter, RecordId, RecordPatch, RecordType};
use crate::tag::OwnershipTag;
use crate::traits::DnsProvider;
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{debug, info};

pub use runner::{RunMode, Runner};

/// A change made by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A record with the current IP had a foreign note and was tagged
    NoteRepaired {
        record_name: String,
        record_id: RecordId,
        previous_note: String,
        note: String,
    },

    /// An owned record pointed at a stale IP and was updated
    ContentUpdated {
        record_name: String,
        record_id: RecordId,
        previous_content: String,
        content: String,
    },

    /// No owned record existed, one was created
    Created {
        record_name: String,
        record_id: RecordId,
        content: String,
    },

    /// An owned record for a subdomain that is no longer desired was deleted
    Deleted {
        record_name: String,
        record_id: RecordId,
        content: String,
    },
}

impl EngineEvent {
    /// Name of the subdomain the change applies to
    pub fn record_name(&self) -> &str {
        match self {
            EngineEvent::NoteRepaired { record_name, .. }
            | EngineEvent::ContentUpdated { record_name, .. }
            | EngineEvent::Created { record_name, .. }
            | EngineEvent::Deleted { record_name, .. } => record_name,
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::NoteRepaired {
                record_name,
                previous_note,
                note,
                ..
            } => write!(
                f,
                "note of A record '{}' changed from {:?} to {:?}",
                record_name, previous_note, note
            ),
            EngineEvent::ContentUpdated {
                record_name,
                previous_content,
                content,
                ..
            } => write!(
                f,
                "A record '{}' changed from {} to {}",
                record_name, previous_content, content
            ),
            EngineEvent::Created {
                record_name,
                content,
                ..
            } => write!(f, "A record '{}' created pointing to {}", record_name, content),
            EngineEvent::Deleted {
                record_name,
                content,
                ..
            } => write!(
                f,
                "A record '{}' ({}) deleted, subdomain no longer configured",
                record_name, content
            ),
        }
    }
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The IP the run reconciled against
    pub ip: Ipv4Addr,
    /// Subdomains that were checked, in order
    pub checked: Vec<String>,
    /// Every change made, in order
    pub changes: Vec<EngineEvent>,
}

impl ReconcileReport {
    fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            checked: Vec::new(),
            changes: Vec::new(),
        }
    }

    /// Whether anything changed during the run
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Number of deleted records
    pub fn removed(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, EngineEvent::Deleted { .. }))
            .count()
    }
}

/// Core DDNS engine
///
/// The engine holds no state between runs. Everything is read back from the
/// provider on each call to [`DdnsEngine::reconcile`].
pub struct DdnsEngine {
    /// DNS provider for reading and writing records
    provider: Box<dyn DnsProvider>,

    /// Channels notified of every change
    notifier: NotificationDispatcher,

    /// Managed domain (used in notifications)
    domain: String,

    /// Desired subdomains, in configured order
    subdomains: Vec<String>,

    /// Note value marking owned records
    tag: OwnershipTag,

    /// TTL of created records
    record_ttl: u32,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `provider`: DNS provider implementation
    /// - `notifier`: notification channels
    /// - `config`: DDNS configuration (validated here)
    pub fn new(
        provider: Box<dyn DnsProvider>,
        notifier: NotificationDispatcher,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            notifier,
            domain: config.websupport.registered_domain.clone(),
            subdomains: config.websupport.subdomains.clone(),
            tag: config.ownership_tag(),
            record_ttl: config.engine.record_ttl,
        })
    }

    /// The provider this engine writes to
    pub fn provider(&self) -> &dyn DnsProvider {
        self.provider.as_ref()
    }

    /// Run one reconciliation against the given IP
    ///
    /// Provider errors are not retried; the first one aborts the run.
    /// Changes made before the error have already been notified.
    pub async fn reconcile(&self, ip: Ipv4Addr) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::new(ip);

        for subdomain in &self.subdomains {
            self.reconcile_subdomain(subdomain, ip, &mut report).await?;
            report.checked.push(subdomain.clone());
        }

        self.remove_stale(&mut report).await?;

        if report.changed() {
            info!(
                "Reconciliation finished: {} change(s) for {} subdomain(s)",
                report.changes.len(),
                report.checked.len()
            );
        } else {
            info!(
                "Reconciliation finished: no changes, {} subdomain(s) up to date",
                report.checked.len()
            );
        }

        Ok(report)
    }

    async fn reconcile_subdomain(
        &self,
        subdomain: &str,
        ip: Ipv4Addr,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let ip = ip.to_string();
        let tag = self.tag.as_str();
        debug!("Now checking subdomain: {}", subdomain);

        // Right IP, wrong note
        let filter = RecordFilter::new()
            .with_type(RecordType::A)
            .with_name(subdomain)
            .with_content(&ip);
        let matching = self.provider.list_records(&filter).await?;
        debug!("Listing {}: found {} record(s)", filter, matching.len());

        match matching.first() {
            Some(record) if record.note != tag => {
                info!("Note of {} is incorrect, editing", subdomain);
                self.provider
                    .edit_record(record.id, &RecordPatch::note(tag))
                    .await?;
                self.emit(
                    report,
                    EngineEvent::NoteRepaired {
                        record_name: subdomain.to_string(),
                        record_id: record.id,
                        previous_note: record.note.clone(),
                        note: tag.to_string(),
                    },
                )
                .await;
            }
            _ => debug!("Record note checked, valid"),
        }

        // Right note, wrong IP, or nothing owned at all
        let filter = RecordFilter::new()
            .with_type(RecordType::A)
            .with_name(subdomain)
            .with_note(tag);
        let owned = self.provider.list_records(&filter).await?;
        debug!("Listing {}: found {} record(s)", filter, owned.len());

        match owned.first() {
            Some(record) if record.content != ip => {
                info!("IP address of {} has changed, editing", subdomain);
                self.provider
                    .edit_record(record.id, &RecordPatch::content(&ip))
                    .await?;
                self.emit(
                    report,
                    EngineEvent::ContentUpdated {
                        record_name: subdomain.to_string(),
                        record_id: record.id,
                        previous_content: record.content.clone(),
                        content: ip.clone(),
                    },
                )
                .await;
            }
            Some(_) => debug!("IP address checked, unchanged"),
            None => {
                info!("No record for {}, creating", subdomain);
                let new = NewRecord::a(subdomain, &ip, tag).with_ttl(self.record_ttl);
                let created = self.provider.create_record(&new).await?;
                self.emit(
                    report,
                    EngineEvent::Created {
                        record_name: subdomain.to_string(),
                        record_id: created.id,
                        content: ip.clone(),
                    },
                )
                .await;
            }
        }

        Ok(())
    }

    /// Delete owned records for subdomains that are no longer desired
    async fn remove_stale(&self, report: &mut ReconcileReport) -> Result<()> {
        debug!("Now searching for subdomains to remove");

        let filter = RecordFilter::new()
            .with_type(RecordType::A)
            .with_note(self.tag.as_str());
        let owned = self.provider.list_records(&filter).await?;

        let mut removed = 0;
        for record in owned {
            if self.subdomains.contains(&record.name) {
                continue;
            }

            self.provider.delete_record(record.id).await?;
            removed += 1;
            self.emit(
                report,
                EngineEvent::Deleted {
                    record_name: record.name,
                    record_id: record.id,
                    content: record.content,
                },
            )
            .await;
        }

        info!("Removed {} record(s)", removed);
        Ok(())
    }

    /// Log, record and notify a change
    async fn emit(&self, report: &mut ReconcileReport, event: EngineEvent) {
        info!("{}", event);
        if !self.notifier.is_empty() {
            let message = format!("{}: {}", self.domain, event);
            self.notifier.notify(&message).await;
        }
        report.changes.push(event);
    }
}
