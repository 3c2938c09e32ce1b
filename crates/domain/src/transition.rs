//! Transitions between adjacent grid cells
//!
//! A transition is the edge payload stored once per cell pair in the
//! [`TransitionStore`](crate::transition_store::TransitionStore). The stored
//! type is the authored baseline; conditions can retype, lock, or unlock it
//! at evaluation time, so nothing here is final until the engine resolves it
//! against game state.

use serde::{Deserialize, Serialize};

use crate::condition::TransitionCondition;
use crate::grid::Direction;

/// Authored transition type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    /// Edge exists but traversal is always refused
    None,
    Bidirectional,
    OneWay,
    Locked,
    Secret,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::None => "none",
            TransitionKind::Bidirectional => "bidirectional",
            TransitionKind::OneWay => "one-way",
            TransitionKind::Locked => "locked",
            TransitionKind::Secret => "secret",
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Edge payload: authored type, optional one-way direction, and conditions
///
/// `direction` names the permitted direction of travel and is only meaningful
/// while the effective type is [`TransitionKind::OneWay`]. It is stored as an
/// absolute cardinal direction, so it reads the same no matter which key
/// orientation the store kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<TransitionCondition>,
}

impl Transition {
    pub fn new(kind: TransitionKind) -> Self {
        Self {
            kind,
            direction: None,
            conditions: Vec::new(),
        }
    }

    /// Open passage in both directions
    pub fn bidirectional() -> Self {
        Self::new(TransitionKind::Bidirectional)
    }

    /// Passage permitted only when traveling in `direction`
    pub fn one_way(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            ..Self::new(TransitionKind::OneWay)
        }
    }

    /// Blocked until an unlock condition holds
    pub fn locked() -> Self {
        Self::new(TransitionKind::Locked)
    }

    /// Hidden until an unlock condition gives it away or a condition retypes
    /// it
    pub fn secret() -> Self {
        Self::new(TransitionKind::Secret)
    }

    pub fn with_condition(mut self, condition: TransitionCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<TransitionCondition>) -> Self {
        self.conditions = conditions;
        self
    }
}
