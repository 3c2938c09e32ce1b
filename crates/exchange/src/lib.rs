//! Gridloom exchange layer
//!
//! The JSON map file format: plain camelCase documents that editors write
//! and game hosts ship. This crate owns the wire records, the codec between
//! them and [`MapGraph`](gridloom_domain::MapGraph), and the structural
//! error taxonomy. It never evaluates conditions; files round-trip whether
//! or not the host understands every predicate in them.

pub mod codec;
pub mod error;
pub mod record;

pub use codec::{from_json_str, load_map, save_map, to_json_string};
pub use error::MapFileError;
pub use record::{
    GridSizeRecord, MapFile, NodeRecord, PositionRecord, TransitionRecord, WireTransitionKind,
};
