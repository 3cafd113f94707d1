//! Ownership tag written into the `note` field of managed records

use std::fmt;

/// Base identifier every ownership tag starts with
pub const BASE_TAG: &str = "websupportsk-ddns";

/// The note value marking a record as managed by this updater
///
/// Format: `websupportsk-ddns[-<suffix>]`. Two updaters with different
/// suffixes can share a zone without touching each other's records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnershipTag(String);

impl OwnershipTag {
    /// Build the tag from an optional custom suffix
    ///
    /// The suffix is used verbatim. An empty suffix yields the bare base tag.
    ///
    /// ```rust
    /// use ddns_core::OwnershipTag;
    ///
    /// assert_eq!(OwnershipTag::new(None).as_str(), "websupportsk-ddns");
    /// assert_eq!(OwnershipTag::new(Some("home")).as_str(), "websupportsk-ddns-home");
    /// ```
    pub fn new(suffix: Option<&str>) -> Self {
        match suffix.filter(|s| !s.is_empty()) {
            Some(suffix) => Self(format!("{}-{}", BASE_TAG, suffix)),
            None => Self(BASE_TAG.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OwnershipTag {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Display for OwnershipTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OwnershipTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
