use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::event_type::EventType;

/// ISO date (`YYYY-MM-DD`) to the items scheduled on that date, kept sorted
/// by priority.
pub type TodoMap = BTreeMap<String, Vec<TodoItem>>;

/// A single to-do entry inside a date bucket.
///
/// `priority`, `color` and `icon` are copies of the classification of
/// `event_type` at the last write and can only change through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    id: usize,
    content: String,
    #[serde(default)]
    completed: bool,
    created_at: NaiveDateTime,
    #[serde(default)]
    event_type: String,
    #[serde(default)]
    priority: u32,
    #[serde(default)]
    color: String,
    #[serde(default)]
    icon: String,
}

impl TodoItem {
    pub(crate) fn new(
        id: usize,
        content: impl Into<String>,
        event_type: impl Into<String>,
        classification: &EventType,
        created_at: NaiveDateTime,
    ) -> Self {
        let mut item = Self {
            id,
            content: content.into(),
            completed: false,
            created_at,
            event_type: event_type.into(),
            priority: 0,
            color: String::new(),
            icon: String::new(),
        };
        item.apply_classification(classification);
        item
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
    }

    pub(crate) fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    /// Switch to a known event type and re-derive the denormalized fields.
    pub(crate) fn reclassify(&mut self, classification: &EventType) {
        self.event_type = classification.key.clone();
        self.apply_classification(classification);
    }

    pub(crate) fn apply_classification(&mut self, classification: &EventType) {
        self.priority = classification.priority;
        self.color = classification.color.clone();
        self.icon = classification.icon.clone();
    }

    pub(crate) fn matches_classification(&self, classification: &EventType) -> bool {
        self.priority == classification.priority
            && self.color == classification.color
            && self.icon == classification.icon
    }
}

/// Partial update for [`TodoItem`]. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

impl TodoPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            event_type: None,
        }
    }

    pub fn event_type(event_type: impl Into<String>) -> Self {
        Self {
            content: None,
            event_type: Some(event_type.into()),
        }
    }
}
