//! State predicates and the conditions that carry them
//!
//! A [`StatePredicate`] names one fact about host game state ("variable
//! `stats.keys` >= `1`"). Predicates never evaluate themselves; the engine
//! crate evaluates them against a state view. The domain layer only fixes
//! their shape and serialization.
//!
//! Two carriers exist: [`NodeCondition`] overrides node presentation, and
//! [`TransitionCondition`] locks, unlocks, or retypes a transition.

use serde::{Deserialize, Serialize};

use crate::transition::TransitionKind;

// ============================================================================
// Predicate vocabulary
// ============================================================================

/// Which slice of host state a predicate reads
///
/// `Unknown` absorbs condition types this build does not know. Evaluation
/// treats those as satisfied so that content authored against a newer host
/// degrades to "open" rather than "broken".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Variable,
    Item,
    Quest,
    #[serde(other)]
    Unknown,
}

/// Comparison operator, serialized as its symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[default]
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
        }
    }

    /// Apply the operator to an already-computed ordering between actual and
    /// target values
    pub fn matches_ordering(&self, ordering: std::cmp::Ordering) -> bool {
        match self {
            ComparisonOp::Eq => ordering.is_eq(),
            ComparisonOp::Ne => ordering.is_ne(),
            ComparisonOp::Ge => ordering.is_ge(),
            ComparisonOp::Le => ordering.is_le(),
            ComparisonOp::Gt => ordering.is_gt(),
            ComparisonOp::Lt => ordering.is_lt(),
        }
    }
}

impl std::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One testable fact about host game state
///
/// `value` is kept as the raw authored string; the evaluator coerces it when
/// the predicate is checked. `None` means "test for presence/truthiness".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePredicate {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    pub name: String,
    #[serde(default)]
    pub operator: ComparisonOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl StatePredicate {
    pub fn new(
        kind: ConditionKind,
        name: impl Into<String>,
        operator: ComparisonOp,
        value: Option<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            operator,
            value,
        }
    }

    /// Predicate over a dotted path into the host variable tree
    pub fn variable(
        name: impl Into<String>,
        operator: ComparisonOp,
        value: impl Into<String>,
    ) -> Self {
        Self::new(ConditionKind::Variable, name, operator, Some(value.into()))
    }

    /// Predicate over an inventory count
    pub fn item(name: impl Into<String>, operator: ComparisonOp, value: impl Into<String>) -> Self {
        Self::new(ConditionKind::Item, name, operator, Some(value.into()))
    }

    /// Predicate over a quest state value
    pub fn quest(
        name: impl Into<String>,
        operator: ComparisonOp,
        value: impl Into<String>,
    ) -> Self {
        Self::new(ConditionKind::Quest, name, operator, Some(value.into()))
    }

    /// Presence check: no target value, satisfied when the named state is
    /// truthy
    pub fn presence(kind: ConditionKind, name: impl Into<String>) -> Self {
        Self::new(kind, name, ComparisonOp::Eq, None)
    }
}

// ============================================================================
// Condition carriers
// ============================================================================

/// Conditional presentation override for a node
///
/// The first matching condition replaces the node passage and, when set, its
/// icon. Later matches are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeCondition {
    #[serde(flatten)]
    pub predicate: StatePredicate,
    pub passage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeCondition {
    pub fn new(predicate: StatePredicate, passage: impl Into<String>) -> Self {
        Self {
            predicate,
            passage: passage.into(),
            icon: None,
            description: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// What a matching transition condition does to the transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionAction {
    LockIf,
    UnlockIf,
    ChangeIf,
}

/// Conditional behavior attached to a transition
///
/// `change_target` is only meaningful for [`ConditionAction::ChangeIf`]; it
/// names the transition type that takes effect while the predicate holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionCondition {
    pub action: ConditionAction,
    #[serde(flatten)]
    pub predicate: StatePredicate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_target: Option<TransitionKind>,
}

impl TransitionCondition {
    pub fn lock_if(predicate: StatePredicate) -> Self {
        Self {
            action: ConditionAction::LockIf,
            predicate,
            change_target: None,
        }
    }

    pub fn unlock_if(predicate: StatePredicate) -> Self {
        Self {
            action: ConditionAction::UnlockIf,
            predicate,
            change_target: None,
        }
    }

    pub fn change_if(predicate: StatePredicate, target: TransitionKind) -> Self {
        Self {
            action: ConditionAction::ChangeIf,
            predicate,
            change_target: Some(target),
        }
    }
}
