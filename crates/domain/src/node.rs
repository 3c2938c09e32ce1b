//! Map nodes
//!
//! A node is the authored content of one grid cell. It is a plain data
//! struct with public fields; the owning
//! [`MapGraph`](crate::map::MapGraph) enforces the structural rules (bounds,
//! entry point uniqueness, delete-on-empty).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::condition::NodeCondition;
use crate::error::DomainError;

/// Tags carrying this prefix mark a node as a named entry point
pub const ENTRY_TAG_PREFIX: &str = "entry-";

/// True when `tag` designates an entry point
pub fn is_entry_tag(tag: &str) -> bool {
    tag.starts_with(ENTRY_TAG_PREFIX)
}

/// Authored content of a single grid cell
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Narrative text shown on arrival
    #[serde(skip_serializing_if = "String::is_empty")]
    pub passage: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
    pub fog_of_war: bool,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub style: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<NodeCondition>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_passage(mut self, passage: impl Into<String>) -> Self {
        self.passage = passage.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_fog_of_war(mut self, fog_of_war: bool) -> Self {
        self.fog_of_war = fog_of_war;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_condition(mut self, condition: NodeCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// A node with every field empty does not exist: saving it deletes the
    /// cell
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.passage.is_empty()
            && self.icon.is_empty()
            && !self.fog_of_war
            && self.tags.is_empty()
            && self.style.is_empty()
            && self.conditions.is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Entry point tags carried by this node
    pub fn entry_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|t| is_entry_tag(t))
    }

    /// Reorder a presentation condition. Condition order is meaningful:
    /// evaluation is first-match-wins.
    pub fn move_condition(&mut self, from: usize, to: usize) -> Result<(), DomainError> {
        let len = self.conditions.len();
        if from >= len || to >= len {
            return Err(DomainError::validation(format!(
                "condition index out of range: {from} -> {to} with {len} conditions"
            )));
        }
        let condition = self.conditions.remove(from);
        self.conditions.insert(to, condition);
        Ok(())
    }
}
