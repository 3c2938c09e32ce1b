//! Gridloom engine layer
//!
//! Everything that needs live game state: condition evaluation against a
//! host-provided [`GameStateView`], traversal resolution with typed
//! rejection reasons, and [`RuntimeSession`], the stateful playthrough of
//! one map.
//!
//! The engine is synchronous and embeds anywhere; hosts drive it one move at
//! a time and decide themselves what to do with the outcomes. Observability
//! is `tracing` based: rejected moves and unknown condition types are logged,
//! never panicked on.

pub mod eval;
pub mod resolve;
pub mod session;
pub mod state;


pub use eval::evaluate;
pub use resolve::{
    can_traverse, check_move, edge_view, effective_kind, effective_node, outgoing_views, EdgeView,
    RejectReason,
};
pub use session::{MoveOutcome, RuntimeSession, TravelEntry, TRAVEL_LOG_CAP};
pub use state::{lookup_path, GameStateView, InMemoryState, ProgressStore};

pub use gridloom_domain as domain;
