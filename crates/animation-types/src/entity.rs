//! Entity movement paths.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::EntityId;

/// Time-ordered movement and state history of one simulated entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityPath {
    /// Entity type (e.g. `Customer`).
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Path points, ascending by `clock`. Never re-sorted on load.
    #[serde(default)]
    pub path: Vec<PathPoint>,
}

/// One sample of an entity's position and state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PathPoint {
    /// Simulation clock of the sample.
    pub clock: f64,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Entity state at this point (e.g. `waiting`, `in_service`).
    pub state: String,
    /// Event that produced this point, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Component the entity was at, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    /// Free-form per-point attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, serde_json::Value>>,
}

/// Contents of one entity path batch file: entity ID to path.
///
/// Entries keep the order they appear in the file. The JSON form is an
/// object keyed by entity ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityPathBatch {
    entries: Vec<(EntityId, EntityPath)>,
}

impl EntityPathBatch {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch holds no entity.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of `id`. If the file repeated the ID, the last entry wins.
    pub fn get(&self, id: &str) -> Option<&EntityPath> {
        self.entries
            .iter()
            .rev()
            .find(|(entry_id, _)| entry_id.as_str() == id)
            .map(|(_, path)| path)
    }

    /// Entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &EntityPath)> {
        self.entries.iter().map(|(id, path)| (id, path))
    }
}

impl FromIterator<(EntityId, EntityPath)> for EntityPathBatch {
    fn from_iter<I: IntoIterator<Item = (EntityId, EntityPath)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EntityPathBatch {
    type Item = (EntityId, EntityPath);
    type IntoIter = std::vec::IntoIter<(EntityId, EntityPath)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a EntityPathBatch {
    type Item = (&'a EntityId, &'a EntityPath);
    type IntoIter = core::iter::Map<
        core::slice::Iter<'a, (EntityId, EntityPath)>,
        fn(&'a (EntityId, EntityPath)) -> (&'a EntityId, &'a EntityPath),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(|(id, path)| (id, path))
    }
}

impl Serialize for EntityPathBatch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, path) in &self.entries {
            map.serialize_entry(id, path)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EntityPathBatch {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BatchVisitor;

        impl<'de> serde::de::Visitor<'de> for BatchVisitor {
            type Value = EntityPathBatch;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("an object mapping entity IDs to paths")
            }

            fn visit_map<M: serde::de::MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((id, path)) = map.next_entry::<EntityId, EntityPath>()? {
                    entries.push((id, path));
                }
                Ok(EntityPathBatch { entries })
            }
        }

        deserializer.deserialize_map(BatchVisitor)
    }
}

/// Interpolated entity position at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityPosition {
    /// The queried clock.
    pub clock: f64,
    /// Interpolated horizontal position.
    pub x: f64,
    /// Interpolated vertical position.
    pub y: f64,
    /// State of the path point at or before `clock`.
    pub state: String,
}
