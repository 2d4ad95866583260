//! Strongly-typed identifiers for replications and entities.
//!
//! A replication is keyed by the integer declared in its manifest
//! metadata, never by the name of the directory it was found in. Entity
//! IDs are opaque strings chosen by the simulation that produced the
//! data.

use core::borrow::Borrow;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of one simulation replication (`metadata.replication`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReplicationId(pub u32);

impl ReplicationId {
    /// Wrap a raw replication number.
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// Return the inner replication number.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ReplicationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ReplicationId {
    fn from(number: u32) -> Self {
        Self(number)
    }
}

impl From<ReplicationId> for u32 {
    fn from(id: ReplicationId) -> Self {
        id.0
    }
}

/// Identifier of one simulated entity within a replication.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityId(pub String);

impl EntityId {
    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(String::from(id))
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// Lets `BTreeMap<EntityId, _>` be queried with a plain `&str`.
impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
