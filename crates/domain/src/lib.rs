//! Gridloom domain layer
//!
//! The data model of grid-based location graphs: bounded grids of authored
//! nodes, canonically stored transitions between them, entry points, and fog
//! of war state. Everything here is pure and synchronous. Rules that need
//! game state (condition evaluation, traversal) live in `gridloom-engine`;
//! the file format lives in `gridloom-exchange`.
//!
//! Design notes:
//! - [`MapGraph`] is the aggregate root and the only mutation surface for
//!   nodes, transitions, and entry points
//! - The domain never logs; non-fatal findings come back as values
//!   (see [`SaveOutcome`])
//! - Validation happens at construction ([`MapId::new`], [`GridSize::new`])
//!   so a held value is always a valid one

pub mod condition;
pub mod entry_points;
pub mod error;
pub mod fog;
pub mod grid;
pub mod map;
pub mod node;
pub mod transition;
pub mod transition_store;

pub use condition::{
    ComparisonOp, ConditionAction, ConditionKind, NodeCondition, StatePredicate,
    TransitionCondition,
};
pub use entry_points::EntryPointRegistry;
pub use error::{DomainError, DomainResult};
pub use fog::FogOfWar;
pub use grid::{Direction, GridSize, Position, MAX_GRID_DIM};
pub use map::{
    EntryPointConflict, MapGraph, MapId, SaveAction, SaveOutcome, MAX_MAP_ID_LENGTH,
    MAX_MAP_NAME_LENGTH,
};
pub use node::{is_entry_tag, Node, ENTRY_TAG_PREFIX};
pub use transition::{Transition, TransitionKind};
pub use transition_store::{OutgoingSlot, ResolvedTransition, TransitionKey, TransitionStore};
