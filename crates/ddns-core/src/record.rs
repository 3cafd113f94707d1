//! DNS record model shared by the engine and provider implementations
//!
//! [`DnsRecord`] mirrors what the provider returns. [`RecordFilter`] is a
//! partial record used to select records: every field that is set must be
//! equal to the record's field, unset fields are unconstrained.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Provider-assigned record identifier
pub type RecordId = u64;

/// Default TTL for records created by the engine (seconds)
pub const DEFAULT_TTL: u32 = 600;

/// DNS record type
///
/// The engine only ever manages `A` records. Other types still show up when
/// listing a zone and are kept verbatim so they never match an `A` filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// Any other record type (CNAME, MX, TXT, ...)
    Other(String),
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        if value == "A" {
            RecordType::A
        } else {
            RecordType::Other(value)
        }
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => f.write_str("A"),
            RecordType::Other(other) => f.write_str(other),
        }
    }
}

/// A DNS record as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned identifier, immutable once created
    pub id: RecordId,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Subdomain label (e.g. "home", or "@" for the apex)
    pub name: String,

    /// Record content, the IPv4 address for `A` records
    pub content: String,

    /// Free-text note, used as the ownership marker
    #[serde(default, deserialize_with = "nullable_string")]
    pub note: String,

    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: u32,
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} (id: {}, ttl: {}, note: {:?})",
            self.record_type, self.name, self.content, self.id, self.ttl, self.note
        )
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Partial record used to select records from a listing
///
/// # Example
///
/// ```rust
/// use ddns_core::record::{RecordFilter, RecordType};
///
/// let filter = RecordFilter::new()
///     .with_type(RecordType::A)
///     .with_name("home");
/// assert!(!filter.is_empty());
/// assert!(RecordFilter::new().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub record_type: Option<RecordType>,
    pub id: Option<RecordId>,
    pub name: Option<String>,
    pub content: Option<String>,
    pub ttl: Option<u32>,
    pub note: Option<String>,
}

impl RecordFilter {
    /// Create an empty filter (matches every record)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// True when no field is constrained
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// AND of equality over every field present in the filter
    pub fn matches(&self, record: &DnsRecord) -> bool {
        fn field<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
            wanted.as_ref().is_none_or(|w| w == actual)
        }

        field(&self.record_type, &record.record_type)
            && field(&self.id, &record.id)
            && field(&self.name, &record.name)
            && field(&self.content, &record.content)
            && field(&self.ttl, &record.ttl)
            && field(&self.note, &record.note)
    }

    /// Keep only the records matching this filter, preserving order
    pub fn apply(&self, records: Vec<DnsRecord>) -> Vec<DnsRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

impl fmt::Display for RecordFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(t) = &self.record_type {
            parts.push(format!("type={}", t));
        }
        if let Some(id) = self.id {
            parts.push(format!("id={}", id));
        }
        if let Some(name) = &self.name {
            parts.push(format!("name={}", name));
        }
        if let Some(content) = &self.content {
            parts.push(format!("content={}", content));
        }
        if let Some(ttl) = self.ttl {
            parts.push(format!("ttl={}", ttl));
        }
        if let Some(note) = &self.note {
            parts.push(format!("note={}", note));
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Payload for creating a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub note: String,
}

impl NewRecord {
    /// An `A` record with the default TTL
    pub fn a(name: impl Into<String>, content: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            record_type: RecordType::A,
            name: name.into(),
            content: content.into(),
            ttl: DEFAULT_TTL,
            note: note.into(),
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Fields to change on an existing record; only present fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl RecordPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }

    /// Apply the patch to a record in place
    pub fn apply_to(&self, record: &mut DnsRecord) {
        if let Some(content) = &self.content {
            record.content = content.clone();
        }
        if let Some(note) = &self.note {
            record.note = note.clone();
        }
        if let Some(ttl) = self.ttl {
            record.ttl = ttl;
        }
    }
}
