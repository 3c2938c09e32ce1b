//! Host state ports
//!
//! The engine never owns game state. Hosts expose it through
//! [`GameStateView`], a read-only window the evaluator queries while checking
//! conditions, and optionally accept progress write-backs through
//! [`ProgressStore`]. Both are object-safe so hosts can hand in whatever they
//! have; [`InMemoryState`] covers tests and simple embeddings.

use std::collections::HashMap;

use serde_json::{Map, Value};

use gridloom_domain::{MapId, Position};

/// Read-only window onto host game state
///
/// `None` means the named state does not exist, which the evaluator treats
/// like an undefined value rather than an error.
#[cfg_attr(test, mockall::automock)]
pub trait GameStateView {
    /// Value at a dotted path into the variable tree
    fn variable(&self, path: &str) -> Option<Value>;

    /// How many of the named item the player holds
    fn item_count(&self, name: &str) -> Option<i64>;

    /// Current state value of the named quest
    fn quest_state(&self, name: &str) -> Option<Value>;
}

/// Sink for runtime progress a host wants to persist
#[cfg_attr(test, mockall::automock)]
pub trait ProgressStore {
    fn record_position(&mut self, map_id: &MapId, position: Position);

    fn record_revealed(&mut self, map_id: &MapId, revealed: &[Position]);
}

/// Walk a dotted path through nested JSON objects (array indices allowed)
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Self-contained state for tests, tools, and hosts without their own store
#[derive(Debug, Clone, Default)]
pub struct InMemoryState {
    variables: Value,
    items: HashMap<String, i64>,
    quests: HashMap<String, Value>,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole variable tree
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_variable(mut self, path: &str, value: Value) -> Self {
        self.set_variable(path, value);
        self
    }

    pub fn with_item(mut self, name: impl Into<String>, count: i64) -> Self {
        self.set_item_count(name, count);
        self
    }

    pub fn with_quest(mut self, name: impl Into<String>, state: Value) -> Self {
        self.set_quest(name, state);
        self
    }

    /// Set a value at a dotted path, creating intermediate objects as needed.
    /// A non-object intermediate is replaced by an object.
    pub fn set_variable(&mut self, path: &str, value: Value) {
        let mut current = &mut self.variables;
        for segment in path.split('.') {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            current = match current {
                Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
                _ => return,
            };
        }
        *current = value;
    }

    pub fn set_item_count(&mut self, name: impl Into<String>, count: i64) {
        self.items.insert(name.into(), count);
    }

    pub fn set_quest(&mut self, name: impl Into<String>, state: Value) {
        self.quests.insert(name.into(), state);
    }
}

impl GameStateView for InMemoryState {
    fn variable(&self, path: &str) -> Option<Value> {
        lookup_path(&self.variables, path).cloned()
    }

    fn item_count(&self, name: &str) -> Option<i64> {
        self.items.get(name).copied()
    }

    fn quest_state(&self, name: &str) -> Option<Value> {
        self.quests.get(name).cloned()
    }
}
