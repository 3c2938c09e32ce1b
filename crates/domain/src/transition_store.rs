//! Canonical transition storage
//!
//! Every edge between two cells is stored exactly once, under whichever
//! orientation last wrote it. Lookups try both orientations and report
//! which one matched, so one payload serves traversal in either direction
//! and the two sides of an edge can never drift apart.

use std::collections::HashMap;

use crate::error::DomainError;
use crate::grid::{Direction, Position};
use crate::transition::Transition;

/// Ordered cell pair used as the storage key for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    pub from: Position,
    pub to: Position,
}

impl TransitionKey {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// The same edge keyed from the other endpoint
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

impl std::fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A lookup hit, carrying the stored orientation
///
/// `reversed` is true when the caller asked for `(from, to)` but the edge is
/// stored as `(to, from)`. Traversal semantics do not depend on it (the
/// one-way direction is absolute), but serializers and editors need to know
/// which endpoint owns the stored record.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTransition<'a> {
    pub transition: &'a Transition,
    pub key: TransitionKey,
    pub reversed: bool,
}

/// One of the four directional slots around a cell
#[derive(Debug, Clone, Copy)]
pub struct OutgoingSlot<'a> {
    pub direction: Direction,
    pub target: Position,
    pub transition: Option<ResolvedTransition<'a>>,
}

/// All transitions of one map, keyed by cell pair
#[derive(Debug, Clone, Default)]
pub struct TransitionStore {
    edges: HashMap<TransitionKey, Transition>,
}

impl TransitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the edge between `from` and `to`.
    ///
    /// Both orientations are cleared first, then the payload is stored under
    /// `(from, to)`. Returns the replaced payload, whichever orientation held
    /// it.
    pub fn put(&mut self, from: Position, to: Position, transition: Transition) -> Option<Transition> {
        let key = TransitionKey::new(from, to);
        let forward = self.edges.remove(&key);
        let backward = self.edges.remove(&key.reversed());
        self.edges.insert(key, transition);
        forward.or(backward)
    }

    /// Look up the edge between two cells, probing both orientations
    pub fn get(&self, from: Position, to: Position) -> Option<ResolvedTransition<'_>> {
        let key = TransitionKey::new(from, to);
        if let Some(transition) = self.edges.get(&key) {
            return Some(ResolvedTransition {
                transition,
                key,
                reversed: false,
            });
        }
        let reversed_key = key.reversed();
        self.edges.get(&reversed_key).map(|transition| ResolvedTransition {
            transition,
            key: reversed_key,
            reversed: true,
        })
    }

    pub fn contains(&self, from: Position, to: Position) -> bool {
        self.get(from, to).is_some()
    }

    /// Remove the edge between two cells, whichever orientation holds it
    pub fn remove(&mut self, from: Position, to: Position) -> Option<Transition> {
        let key = TransitionKey::new(from, to);
        self.edges
            .remove(&key)
            .or_else(|| self.edges.remove(&key.reversed()))
    }

    /// Remove every edge that starts or ends at `position`. Returns how many
    /// were removed. Used when a node is deleted so no dangling edges keep
    /// pointing at the empty cell.
    pub fn remove_all_touching(&mut self, position: Position) -> usize {
        let before = self.edges.len();
        self.edges
            .retain(|key, _| key.from != position && key.to != position);
        before - self.edges.len()
    }

    /// The four directional slots around `from`, each with the resolved edge
    /// toward that neighbor if one exists
    pub fn list_outgoing(&self, from: Position) -> [OutgoingSlot<'_>; 4] {
        from.neighbors().map(|(direction, target)| OutgoingSlot {
            direction,
            target,
            transition: self.get(from, target),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransitionKey, &Transition)> {
        self.edges.iter().map(|(key, transition)| (*key, transition))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Verify the single-orientation invariant.
    ///
    /// The mutating API cannot violate it; this guards stores rebuilt from
    /// external data.
    pub fn validate(&self) -> Result<(), DomainError> {
        for key in self.edges.keys() {
            let reversed = key.reversed();
            if reversed != *key && self.edges.contains_key(&reversed) {
                return Err(DomainError::constraint(format!(
                    "transition stored in both orientations: {key}"
                )));
            }
        }
        Ok(())
    }
}
