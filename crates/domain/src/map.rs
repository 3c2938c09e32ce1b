//! Map graph aggregate
//!
//! [`MapGraph`] owns the cells, transitions, and entry points of one map and
//! is the only mutation surface. All structural rules live here: bounds
//! checks, delete-on-empty, transition cascade on node deletion, and entry
//! point uniqueness with eviction.
//!
//! The aggregate never logs. Non-fatal findings (evicted entry points,
//! cascade counts) come back as values in [`SaveOutcome`] so the caller can
//! decide what to surface.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entry_points::EntryPointRegistry;
use crate::error::DomainError;
use crate::grid::{GridSize, Position};
use crate::node::{is_entry_tag, Node, ENTRY_TAG_PREFIX};
use crate::transition::{Transition, TransitionKind};
use crate::transition_store::{OutgoingSlot, TransitionStore};

/// Maximum length of a map identifier
pub const MAX_MAP_ID_LENGTH: usize = 64;

/// Maximum length of a map display name
pub const MAX_MAP_NAME_LENGTH: usize = 200;

// ============================================================================
// MapId
// ============================================================================

/// Validated map identifier: trimmed, non-empty, bounded length
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MapId(String);

impl MapId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("map id must not be empty"));
        }
        if trimmed.len() > MAX_MAP_ID_LENGTH {
            return Err(DomainError::invalid_id(format!(
                "map id must not exceed {MAX_MAP_ID_LENGTH} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MapId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MapId> for String {
    fn from(id: MapId) -> Self {
        id.0
    }
}

impl AsRef<str> for MapId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Save outcome
// ============================================================================

/// What a node save actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    Created,
    Updated,
    /// The node was saved empty (or deleted directly) and removed
    Deleted,
    /// Nothing existed and nothing was written
    Unchanged,
}

/// An entry type that moved because a save re-claimed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointConflict {
    pub entry_type: String,
    pub previous: Position,
    pub assigned: Position,
}

impl fmt::Display for EntryPointConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entry point '{}' moved from {} to {}",
            self.entry_type, self.previous, self.assigned
        )
    }
}

/// Result of a node save or delete. Conflicts are reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub action: SaveAction,
    /// Transitions cascaded away by a delete
    pub removed_transitions: usize,
    /// Entry types this save took over from other nodes
    pub entry_conflicts: Vec<EntryPointConflict>,
}

impl SaveOutcome {
    fn unchanged() -> Self {
        Self {
            action: SaveAction::Unchanged,
            removed_transitions: 0,
            entry_conflicts: Vec::new(),
        }
    }
}

// ============================================================================
// MapGraph
// ============================================================================

/// One map: a bounded grid of nodes plus the transitions between them
#[derive(Debug, Clone)]
pub struct MapGraph {
    id: MapId,
    name: String,
    size: GridSize,
    default_start: Position,
    /// Derived: true while any node has its fog flag set
    fog_of_war: bool,
    nodes: HashMap<Position, Node>,
    transitions: TransitionStore,
    entry_points: EntryPointRegistry,
}

impl MapGraph {
    /// Create an empty map. The default start is the origin cell, which every
    /// valid grid contains.
    pub fn new(id: MapId, name: impl Into<String>, size: GridSize) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            default_start: Position::new(0, 0),
            fog_of_war: false,
            nodes: HashMap::new(),
            transitions: TransitionStore::new(),
            entry_points: EntryPointRegistry::new(),
        }
    }

    /// Like [`new`](Self::new), but applies the same name rule as
    /// [`set_name`](Self::set_name). Constructor for names from untrusted
    /// input, such as map files.
    pub fn try_new(
        id: MapId,
        name: impl Into<String>,
        size: GridSize,
    ) -> Result<Self, DomainError> {
        let mut map = Self::new(id, String::new(), size);
        map.set_name(name)?;
        Ok(map)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn id(&self) -> &MapId {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[inline]
    pub fn default_start(&self) -> Position {
        self.default_start
    }

    /// True while at least one node opts into fog of war
    #[inline]
    pub fn fog_of_war(&self) -> bool {
        self.fog_of_war
    }

    pub fn node(&self, position: Position) -> Option<&Node> {
        self.nodes.get(&position)
    }

    pub fn has_node(&self, position: Position) -> bool {
        self.nodes.contains_key(&position)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (Position, &Node)> {
        self.nodes.iter().map(|(p, n)| (*p, n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn transitions(&self) -> &TransitionStore {
        &self.transitions
    }

    /// The stored transition between two cells, whichever orientation holds it
    pub fn transition(&self, from: Position, to: Position) -> Option<&Transition> {
        self.transitions.get(from, to).map(|resolved| resolved.transition)
    }

    /// The four directional slots around `position`
    pub fn outgoing(&self, position: Position) -> [OutgoingSlot<'_>; 4] {
        self.transitions.list_outgoing(position)
    }

    #[inline]
    pub fn entry_points(&self) -> &EntryPointRegistry {
        &self.entry_points
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        if name.len() > MAX_MAP_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "map name must not exceed {MAX_MAP_NAME_LENGTH} characters"
            )));
        }
        self.name = name;
        Ok(())
    }

    pub fn set_default_start(&mut self, position: Position) -> Result<(), DomainError> {
        if !self.size.contains(position) {
            return Err(DomainError::validation(format!(
                "default start {position} is outside the {} grid",
                self.size
            )));
        }
        self.default_start = position;
        Ok(())
    }

    /// Save the full state of one cell.
    ///
    /// Saving an empty node deletes the cell (with transition cascade and
    /// entry point release). Saving a node with entry tags claims those entry
    /// types: a previous holder loses the tag and the move is reported as a
    /// conflict in the outcome.
    pub fn save_node(&mut self, position: Position, node: Node) -> Result<SaveOutcome, DomainError> {
        if !self.size.contains(position) {
            return Err(DomainError::validation(format!(
                "position {position} is outside the {} grid",
                self.size
            )));
        }
        if node.is_empty() {
            return Ok(self.delete_node(position));
        }

        // Entry types this cell held but the new content no longer claims
        let held: Vec<String> = self
            .entry_points
            .entry_types_at(position)
            .map(String::from)
            .collect();
        for entry_type in held {
            if !node.has_tag(&entry_type) {
                self.entry_points.remove(&entry_type);
            }
        }

        let mut entry_conflicts = Vec::new();
        let claimed: Vec<String> = node.entry_tags().map(String::from).collect();
        for entry_type in claimed {
            if let Some(previous) = self.entry_points.assign(entry_type.clone(), position) {
                // The evicted node loses the tag so tags and registry agree
                if let Some(evicted) = self.nodes.get_mut(&previous) {
                    evicted.remove_tag(&entry_type);
                }
                entry_conflicts.push(EntryPointConflict {
                    entry_type,
                    previous,
                    assigned: position,
                });
            }
        }

        let action = if self.nodes.insert(position, node).is_some() {
            SaveAction::Updated
        } else {
            SaveAction::Created
        };
        self.sync_fog_flag();

        Ok(SaveOutcome {
            action,
            removed_transitions: 0,
            entry_conflicts,
        })
    }

    /// Delete the node at `position`, cascading away every transition that
    /// touches the cell and releasing its entry types
    pub fn delete_node(&mut self, position: Position) -> SaveOutcome {
        if self.nodes.remove(&position).is_none() {
            return SaveOutcome::unchanged();
        }
        let removed_transitions = self.transitions.remove_all_touching(position);
        self.entry_points.release_position(position);
        self.sync_fog_flag();
        SaveOutcome {
            action: SaveAction::Deleted,
            removed_transitions,
            entry_conflicts: Vec::new(),
        }
    }

    /// Insert or replace the transition between two cells.
    ///
    /// Endpoints must be distinct in-bounds cells and at least one of them
    /// must hold a node. Adjacency is not required here; only directional
    /// traversal and serialization care about it.
    pub fn set_transition(
        &mut self,
        from: Position,
        to: Position,
        transition: Transition,
    ) -> Result<(), DomainError> {
        if !self.size.contains(from) || !self.size.contains(to) {
            return Err(DomainError::validation(format!(
                "transition {from} -> {to} leaves the {} grid",
                self.size
            )));
        }
        if from == to {
            return Err(DomainError::validation(
                "transition endpoints must be distinct cells",
            ));
        }
        if !self.nodes.contains_key(&from) && !self.nodes.contains_key(&to) {
            return Err(DomainError::validation(format!(
                "transition {from} -> {to} connects two empty cells"
            )));
        }
        if transition.kind == TransitionKind::OneWay && transition.direction.is_none() {
            return Err(DomainError::validation(
                "one-way transition requires a permitted direction",
            ));
        }
        self.transitions.put(from, to, transition);
        Ok(())
    }

    pub fn remove_transition(&mut self, from: Position, to: Position) -> Option<Transition> {
        self.transitions.remove(from, to)
    }

    /// Point an entry type directly at a cell.
    ///
    /// Editor-facing variant of the tag sync in [`Self::save_node`]: the
    /// target node gains the tag, a previous holder loses it, and the move is
    /// reported as a conflict in the outcome.
    pub fn assign_entry_point(
        &mut self,
        entry_type: impl Into<String>,
        position: Position,
    ) -> Result<SaveOutcome, DomainError> {
        let entry_type = entry_type.into();
        if !is_entry_tag(&entry_type) {
            return Err(DomainError::validation(format!(
                "entry type '{entry_type}' must start with '{ENTRY_TAG_PREFIX}'"
            )));
        }
        let Some(node) = self.nodes.get_mut(&position) else {
            return Err(DomainError::not_found("node", position.to_string()));
        };
        node.add_tag(entry_type.clone());

        let mut entry_conflicts = Vec::new();
        if let Some(previous) = self.entry_points.assign(entry_type.clone(), position) {
            if let Some(evicted) = self.nodes.get_mut(&previous) {
                evicted.remove_tag(&entry_type);
            }
            entry_conflicts.push(EntryPointConflict {
                entry_type,
                previous,
                assigned: position,
            });
        }
        Ok(SaveOutcome {
            action: SaveAction::Updated,
            removed_transitions: 0,
            entry_conflicts,
        })
    }

    fn sync_fog_flag(&mut self) {
        self.fog_of_war = self.nodes.values().any(|n| n.fog_of_war);
    }
}
