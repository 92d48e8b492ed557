use serde::{Deserialize, Serialize};

/// Key used when a caller does not name an event type, and the fallback
/// classification for keys the table does not know.
pub const DEFAULT_EVENT_TYPE: &str = "priority4";

/// A classification for to-do items. Lower `priority` is more urgent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub key: String,
    pub priority: u32,
    pub color: String,
    pub icon: String,
    pub name: String,
}

impl EventType {
    pub fn new(
        key: impl Into<String>,
        priority: u32,
        color: impl Into<String>,
        icon: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            priority,
            color: color.into(),
            icon: icon.into(),
            name: name.into(),
        }
    }
}

/// Lookup table of known event types.
///
/// Always contains [`DEFAULT_EVENT_TYPE`], so [`EventTypeTable::classify`]
/// never fails.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTypeTable {
    types: Vec<EventType>,
}

impl Default for EventTypeTable {
    fn default() -> Self {
        Self {
            types: vec![
                EventType::new("priority1", 1, "#ff4757", "🔴", "Priority1"),
                EventType::new("priority2", 2, "#ffa502", "🟠", "Priority2"),
                EventType::new("priority3", 3, "#1e90ff", "🔵", "Priority3"),
                EventType::new("priority4", 4, "#2ed573", "🟢", "Priority4"),
            ],
        }
    }
}

impl EventTypeTable {
    pub fn get(&self, key: &str) -> Option<&EventType> {
        self.types.iter().find(|t| t.key == key)
    }

    /// Classification for `key`, or the default type's when `key` is unknown.
    pub fn classify(&self, key: &str) -> &EventType {
        self.get(key)
            .or_else(|| self.get(DEFAULT_EVENT_TYPE))
            .unwrap_or(&self.types[0])
    }

    /// Add a custom type, replacing any existing type with the same key.
    pub fn register(&mut self, event_type: EventType) {
        match self.types.iter_mut().find(|t| t.key == event_type.key) {
            Some(existing) => *existing = event_type,
            None => self.types.push(event_type),
        }
        self.types.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.key.cmp(&b.key)));
    }

    /// Known types in ascending priority.
    pub fn iter(&self) -> impl Iterator<Item = &EventType> {
        self.types.iter()
    }
}
