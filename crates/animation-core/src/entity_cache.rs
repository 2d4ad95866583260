//! Flat index of the active replication's entity paths.
//!
//! Entities from every loaded batch file are merged into one index. A
//! later batch that repeats an entity ID replaces the earlier path
//! without complaint. Files are tracked by path so each one is merged
//! at most once per activation.

use std::collections::{BTreeMap, BTreeSet};

use animation_types::{EntityId, EntityPath, EntityPathBatch, EntityPosition};

use crate::interpolate::{bracket, interpolate};

/// Entity paths of the active replication.
#[derive(Debug, Clone, Default)]
pub struct EntityPathCache {
    index: BTreeMap<EntityId, EntityPath>,
    insertion_order: Vec<EntityId>,
    loaded_files: BTreeSet<String>,
}

impl EntityPathCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entity and forget which files were loaded.
    pub fn clear(&mut self) {
        self.index.clear();
        self.insertion_order.clear();
        self.loaded_files.clear();
    }

    /// Whether `file_path` was merged since the last [`clear`](Self::clear).
    pub fn is_loaded(&self, file_path: &str) -> bool {
        self.loaded_files.contains(file_path)
    }

    /// Merge a parsed batch. Returns the number of entities that replaced
    /// an existing entry.
    ///
    /// Callers check [`is_loaded`](Self::is_loaded) first; merging the
    /// same path twice is harmless but wasteful.
    pub fn insert_batch(&mut self, file_path: &str, batch: EntityPathBatch) -> usize {
        self.loaded_files.insert(String::from(file_path));

        let mut replaced = 0_usize;
        for (id, path) in batch {
            if self.index.contains_key(&id) {
                replaced = replaced.saturating_add(1);
                self.index.insert(id, path);
            } else {
                self.insertion_order.push(id.clone());
                self.index.insert(id, path);
            }
        }
        replaced
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no entity is indexed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Path of one entity.
    pub fn get(&self, id: &str) -> Option<&EntityPath> {
        self.index.get(id)
    }

    /// All indexed IDs in the order they were first seen.
    pub fn ids(&self) -> Vec<&EntityId> {
        self.insertion_order.iter().collect()
    }

    /// Entities whose type equals `entity_type`. Linear scan.
    pub fn by_type(&self, entity_type: &str) -> BTreeMap<&EntityId, &EntityPath> {
        self.index
            .iter()
            .filter(|(_, path)| path.entity_type == entity_type)
            .collect()
    }

    /// Interpolated position of one entity at `clock`.
    pub fn position_at(&self, id: &str, clock: f64) -> Option<EntityPosition> {
        self.get(id).and_then(|path| position_at(path, clock))
    }
}

/// Interpolate `x` and `y` of a path at `clock`.
///
/// Uses the first pair of points bracketing `clock`; the reported state
/// is the state of the earlier point unless `clock` lands exactly on the
/// later one. A single-point path only answers at its own clock.
pub fn position_at(path: &EntityPath, clock: f64) -> Option<EntityPosition> {
    if let [only] = path.path.as_slice() {
        #[allow(clippy::float_cmp)]
        let at_own_clock = clock == only.clock;
        return at_own_clock.then(|| EntityPosition {
            clock,
            x: only.x,
            y: only.y,
            state: only.state.clone(),
        });
    }

    let (a, b) = bracket(&path.path, clock, |p| p.clock)?;
    let state = if clock >= b.clock && b.clock > a.clock {
        b.state.clone()
    } else {
        a.state.clone()
    };
    Some(EntityPosition {
        clock,
        x: interpolate(clock, (a.clock, a.x), (b.clock, b.x)),
        y: interpolate(clock, (a.clock, a.y), (b.clock, b.y)),
        state,
    })
}
