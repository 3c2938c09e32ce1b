//! Entry point registry
//!
//! Each entry type ("entry-main", "entry-cellar") names at most one position
//! on the map. The registry is derived from node tags by the owning
//! [`MapGraph`](crate::map::MapGraph): tagging a node claims the entry type
//! and evicts any previous holder.

use std::collections::BTreeMap;

use crate::grid::Position;

/// Unique mapping from entry type to position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPointRegistry {
    entries: BTreeMap<String, Position>,
}

impl EntryPointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `entry_type` for `position`.
    ///
    /// Returns the position that previously held the entry type, if it was a
    /// different one. Re-assigning the same position is a no-op.
    pub fn assign(&mut self, entry_type: impl Into<String>, position: Position) -> Option<Position> {
        match self.entries.insert(entry_type.into(), position) {
            Some(previous) if previous != position => Some(previous),
            _ => None,
        }
    }

    pub fn resolve(&self, entry_type: &str) -> Option<Position> {
        self.entries.get(entry_type).copied()
    }

    pub fn remove(&mut self, entry_type: &str) -> Option<Position> {
        self.entries.remove(entry_type)
    }

    /// Drop every entry type held by `position`. Returns the released types.
    pub fn release_position(&mut self, position: Position) -> Vec<String> {
        let released: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, p)| **p == position)
            .map(|(t, _)| t.clone())
            .collect();
        for entry_type in &released {
            self.entries.remove(entry_type);
        }
        released
    }

    /// Entry types currently held by `position`
    pub fn entry_types_at(&self, position: Position) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(_, p)| **p == position)
            .map(|(t, _)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
        self.entries.iter().map(|(t, p)| (t.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
