//! Wire records of the map file format
//!
//! The file is plain camelCase JSON meant to live in a game's content
//! directory and survive hand edits. Nodes carry their own transitions per
//! direction, so every edge appears on both endpoints; the codec keeps the
//! two records consistent. These types mirror the file exactly and do no
//! validation beyond what serde enforces; the codec owns the rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gridloom_domain::{Direction, Node, TransitionCondition};

/// Top-level map document
///
/// `nodes` is required: a file without a node array is structurally invalid
/// even when the map is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFile {
    pub map_id: String,
    pub name: String,
    pub grid_size: GridSizeRecord,
    pub default_start: PositionRecord,
    pub nodes: Vec<NodeRecord>,
}

impl MapFile {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSizeRecord {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub x: i32,
    pub y: i32,
}

/// One authored cell plus its outgoing transition slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub column: i32,
    pub row: i32,
    #[serde(flatten)]
    pub node: Node,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transitions: BTreeMap<Direction, TransitionRecord>,
}

/// Transition type as written in files
///
/// `one-way-blocked` never exists in the domain model: it is the mirror
/// record written on the endpoint a one-way transition departs from the
/// other side. `Unknown` absorbs future types; the codec keeps such edges
/// but loads them as impassable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireTransitionKind {
    None,
    Bidirectional,
    OneWay,
    Locked,
    Secret,
    OneWayBlocked,
    #[serde(other)]
    Unknown,
}

/// One directional slot on a node record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    #[serde(rename = "type")]
    pub kind: WireTransitionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<TransitionCondition>,
    /// Permitted travel direction of a `one-way` record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// On a `one-way-blocked` mirror: the direction travel is permitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_direction: Option<Direction>,
    /// On a `one-way-blocked` mirror: the direction this node may not travel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_direction: Option<Direction>,
}
