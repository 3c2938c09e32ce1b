//! Runtime traversal sessions
//!
//! A [`RuntimeSession`] owns one map and a player position on it, and is the
//! only thing that moves the player. Every move is compute-then-commit: all
//! checks run against current state first, and only a fully permitted step
//! mutates the session. A rejected move changes nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gridloom_domain::{
    Direction, DomainError, FogOfWar, MapGraph, Node, Position,
};

use crate::resolve::{self, EdgeView, RejectReason};
use crate::state::{GameStateView, ProgressStore};

/// Travel history kept per session; older entries fall off
pub const TRAVEL_LOG_CAP: usize = 256;

/// One completed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelEntry {
    pub at: DateTime<Utc>,
    pub from: Position,
    pub to: Position,
    pub direction: Direction,
}

/// Result of a move attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MoveOutcome {
    Moved {
        position: Position,
        /// The arrival node with presentation conditions already applied
        node: Node,
        /// Cells this step newly revealed
        revealed: Vec<Position>,
    },
    Rejected {
        reason: RejectReason,
    },
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// A live playthrough of one map
pub struct RuntimeSession {
    id: Uuid,
    map: MapGraph,
    position: Position,
    fog: FogOfWar,
    travel_log: Vec<TravelEntry>,
    progress: Option<Box<dyn ProgressStore>>,
}

impl RuntimeSession {
    /// Start at the map's default start position
    pub fn start(map: MapGraph) -> Result<Self, DomainError> {
        let start = map.default_start();
        Self::start_at(map, start)
    }

    /// Start at an explicit position, which must hold a node
    pub fn start_at(map: MapGraph, position: Position) -> Result<Self, DomainError> {
        if !map.has_node(position) {
            return Err(DomainError::not_found("Node", position.to_string()));
        }
        let mut session = Self {
            id: Uuid::new_v4(),
            map,
            position,
            fog: FogOfWar::new(),
            travel_log: Vec::new(),
            progress: None,
        };
        session.fog.reveal_around(&session.map, session.position);
        tracing::debug!(session = %session.id, map = %session.map.id(), position = %session.position, "Session started");
        Ok(session)
    }

    /// Start at a named entry point ("entry-main", "entry-cellar", ...)
    pub fn start_at_entry(map: MapGraph, entry_type: &str) -> Result<Self, DomainError> {
        let position = map
            .entry_points()
            .resolve(entry_type)
            .ok_or_else(|| DomainError::not_found("EntryPoint", entry_type))?;
        Self::start_at(map, position)
    }

    /// Restore previously persisted fog state. The current position is
    /// revealed again afterwards, arrival rules apply on resume too.
    pub fn with_fog(mut self, fog: FogOfWar) -> Self {
        self.fog = fog;
        self.fog.reveal_around(&self.map, self.position);
        self
    }

    /// Attach a progress sink. It is brought up to date immediately.
    pub fn with_progress_store(mut self, mut store: Box<dyn ProgressStore>) -> Self {
        store.record_position(self.map.id(), self.position);
        let revealed: Vec<Position> = self.fog.revealed(self.map.id()).collect();
        if !revealed.is_empty() {
            store.record_revealed(self.map.id(), &revealed);
        }
        self.progress = Some(store);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn map(&self) -> &MapGraph {
        &self.map
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn fog(&self) -> &FogOfWar {
        &self.fog
    }

    pub fn travel_log(&self) -> &[TravelEntry] {
        &self.travel_log
    }

    /// The stored node under the player
    pub fn current_node(&self) -> Option<&Node> {
        self.map.node(self.position)
    }

    /// The node under the player as it should be shown right now
    pub fn current_node_view(&self, state: &dyn GameStateView) -> Option<Node> {
        self.current_node()
            .map(|node| resolve::effective_node(node, state))
    }

    /// All four directional slots around the player, resolved against state
    pub fn outgoing(&self, state: &dyn GameStateView) -> [EdgeView; 4] {
        resolve::outgoing_views(&self.map, self.position, state)
    }

    /// Visibility of a cell under this session's fog state
    pub fn is_revealed(&self, position: Position) -> bool {
        self.fog
            .is_revealed(self.map.id(), position, self.map.fog_of_war())
    }

    // ------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------

    /// Attempt one step. On success the session commits position, fog,
    /// travel log, and progress sink together; on rejection nothing changes.
    pub fn move_to(&mut self, direction: Direction, state: &dyn GameStateView) -> MoveOutcome {
        let from = self.position;
        let target = match resolve::check_move(&self.map, from, direction, state) {
            Ok(target) => target,
            Err(reason) => {
                tracing::debug!(
                    session = %self.id,
                    %from,
                    %direction,
                    %reason,
                    "Move rejected"
                );
                return MoveOutcome::Rejected { reason };
            }
        };

        let Some(stored) = self.map.node(target) else {
            // check_move already verified the destination node
            return MoveOutcome::Rejected {
                reason: RejectReason::NoDestination,
            };
        };
        let node = resolve::effective_node(stored, state);

        // Commit
        let revealed = self.fog.reveal_around(&self.map, target);
        self.position = target;
        self.push_travel(from, target, direction);
        if let Some(store) = self.progress.as_mut() {
            store.record_position(self.map.id(), target);
            if !revealed.is_empty() {
                store.record_revealed(self.map.id(), &revealed);
            }
        }
        tracing::debug!(
            session = %self.id,
            %from,
            to = %target,
            %direction,
            "Moved"
        );

        MoveOutcome::Moved {
            position: target,
            node,
            revealed,
        }
    }

    fn push_travel(&mut self, from: Position, to: Position, direction: Direction) {
        if self.travel_log.len() == TRAVEL_LOG_CAP {
            self.travel_log.remove(0);
        }
        self.travel_log.push(TravelEntry {
            at: Utc::now(),
            from,
            to,
            direction,
        });
    }
}
