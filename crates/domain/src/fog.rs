//! Fog of war tracking
//!
//! Revealed cells accumulate per map and never un-reveal. A radius reveal
//! always marks its center; neighbors are marked only when they hold a node.
//! Whether fog applies at all is the map's call ([`MapGraph::fog_of_war`]);
//! the tracker records visits either way and the query side decides
//! visibility.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::map::{MapGraph, MapId};

/// Monotonic per-map sets of revealed cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FogOfWar {
    revealed: BTreeMap<MapId, BTreeSet<Position>>,
}

impl FogOfWar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one cell revealed. Returns true when the cell was not yet
    /// revealed.
    pub fn reveal(&mut self, map_id: &MapId, position: Position) -> bool {
        self.revealed
            .entry(map_id.clone())
            .or_default()
            .insert(position)
    }

    /// Reveal `center` unconditionally, plus the orthogonal neighbors that
    /// hold a node on `map`. Returns the newly revealed cells, center first,
    /// neighbors in cardinal order.
    pub fn reveal_around(&mut self, map: &MapGraph, center: Position) -> Vec<Position> {
        let mut newly = Vec::new();
        if self.reveal(map.id(), center) {
            newly.push(center);
        }
        for (_, neighbor) in center.neighbors() {
            if map.has_node(neighbor) && self.reveal(map.id(), neighbor) {
                newly.push(neighbor);
            }
        }
        newly
    }

    /// Visibility of a cell. With fog disabled everything is visible;
    /// otherwise only revealed cells are.
    pub fn is_revealed(&self, map_id: &MapId, position: Position, fog_enabled: bool) -> bool {
        if !fog_enabled {
            return true;
        }
        self.revealed
            .get(map_id)
            .is_some_and(|cells| cells.contains(&position))
    }

    /// All revealed cells of one map, in coordinate order
    pub fn revealed(&self, map_id: &MapId) -> impl Iterator<Item = Position> + '_ {
        self.revealed.get(map_id).into_iter().flatten().copied()
    }

    pub fn revealed_count(&self, map_id: &MapId) -> usize {
        self.revealed.get(map_id).map_or(0, BTreeSet::len)
    }
}
