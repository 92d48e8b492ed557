use crate::calendar::{parse_long_date, to_iso};
use crate::event_type::{DEFAULT_EVENT_TYPE, EventTypeTable};
use crate::persistence::{JsonFileStorage, PersistenceError, TodoStorage};
use crate::review::{self, ReviewReport};
use crate::todo::{TodoItem, TodoMap, TodoPatch};
use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::path::Path;

/// Event type retired from older data files; such items become the default type.
const LEGACY_EVENT_TYPE: &str = "meeting";

/// Demo schedule for [`TodoStore::seed_samples`].
const SAMPLE_TODOS: [(&str, &str, &str); 16] = [
    ("September 1, 2025", "Product Launch Meeting", "priority1"),
    ("September 3, 2025", "Interview at 9 a.m.", "priority1"),
    ("August 15, 2025", "FA Exam at Hall1 at 9 a.m.", "priority1"),
    ("September 13, 2025", "City Marathon", "priority1"),
    ("September 4, 2025", "Morning Run 5KM", "priority2"),
    ("September 14, 2025", "Yoga at 1p.m.", "priority2"),
    ("July 16, 2025", "Oral practice1h", "priority2"),
    ("September 13, 2025", "Booking hotel in Barcelona", "priority2"),
    ("September 14, 2025", "chat with new neighbors", "priority3"),
    ("September 1, 2025", "Car cleaning", "priority3"),
    ("September 17, 2025", "Coffee machine maintenance", "priority3"),
    ("September 18, 2025", "Farewell Party", "priority3"),
    ("August 15, 2025", "Shopping for a skirt", "priority4"),
    ("July 16, 2025", "Game Star", "priority4"),
    ("September 14, 2025", "Rednotebook Browsing", "priority4"),
    ("September 5, 2025", "MineCraft", "priority4"),
];

#[derive(Debug)]
pub enum StoreError {
    InvalidDateFormat(String),
    Persistence(PersistenceError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidDateFormat(input) => write!(
                f,
                "invalid date '{input}': expected a date like 'September 1, 2025'"
            ),
            StoreError::Persistence(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Persistence(err) => Some(err),
            StoreError::InvalidDateFormat(_) => None,
        }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// In-memory schedule with write-through persistence.
///
/// Every mutating call persists the full snapshot before it returns, so a
/// successful return means the change is on storage.
pub struct TodoStore {
    storage: Box<dyn TodoStorage>,
    todos: TodoMap,
    event_types: EventTypeTable,
}

impl TodoStore {
    /// Open a store backed by a JSON document at `path`. A missing file
    /// yields an empty store.
    pub fn create<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open(Box::new(JsonFileStorage::new(path)))
    }

    pub fn open(storage: Box<dyn TodoStorage>) -> StoreResult<Self> {
        Self::with_event_types(storage, EventTypeTable::default())
    }

    pub fn with_event_types(
        storage: Box<dyn TodoStorage>,
        event_types: EventTypeTable,
    ) -> StoreResult<Self> {
        let todos = storage.load_todos()?.unwrap_or_default();
        let mut store = Self {
            storage,
            todos,
            event_types,
        };
        log::info!(
            "loaded {} dates ({} items)",
            store.todos.len(),
            store.todos.values().map(Vec::len).sum::<usize>()
        );
        if store.normalize_loaded_items() {
            store.persist()?;
        }
        Ok(store)
    }

    /// Flush the current snapshot and release the backend.
    pub fn shutdown(self) -> StoreResult<()> {
        self.persist()?;
        log::debug!("store shut down");
        Ok(())
    }

    /// Write the current snapshot without giving up the store.
    pub fn flush(&self) -> StoreResult<()> {
        self.persist()
    }

    pub fn event_types(&self) -> &EventTypeTable {
        &self.event_types
    }

    pub fn todos(&self) -> &TodoMap {
        &self.todos
    }

    /// Add an item on the date given in long form ("September 1, 2025").
    ///
    /// An absent `event_type` is stored as the default type; an unknown one is
    /// kept verbatim but classified like the default type.
    pub fn add_todo(
        &mut self,
        date_input: &str,
        content: &str,
        event_type: Option<&str>,
    ) -> StoreResult<TodoItem> {
        self.add_todo_at(date_input, content, event_type, Local::now().naive_local())
    }

    pub fn add_todo_at(
        &mut self,
        date_input: &str,
        content: &str,
        event_type: Option<&str>,
        created_at: NaiveDateTime,
    ) -> StoreResult<TodoItem> {
        let iso_date = to_iso(parse_long_date(date_input)?);
        let previous = self.todos.get(&iso_date).cloned();
        let item = self.insert_item(&iso_date, content, event_type, created_at);
        self.persist_or_restore(&iso_date, previous)?;
        Ok(item)
    }

    /// Items for an ISO date, or an empty slice.
    pub fn get_todos(&self, iso_date: &str) -> &[TodoItem] {
        self.todos.get(iso_date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply `patch` to the matching item. Unknown event types in the patch are
    /// ignored. Returns `false` when the date or id does not exist.
    pub fn update_todo(&mut self, iso_date: &str, id: usize, patch: TodoPatch) -> StoreResult<bool> {
        let Some(bucket) = self.todos.get_mut(iso_date) else {
            return Ok(false);
        };
        let previous = bucket.clone();
        let Some(item) = bucket.iter_mut().find(|t| t.id() == id) else {
            return Ok(false);
        };

        if let Some(content) = patch.content {
            item.set_content(content);
        }
        if let Some(key) = patch.event_type {
            match self.event_types.get(&key) {
                Some(classification) => item.reclassify(classification),
                None => log::debug!("ignoring unknown event type '{key}' in update"),
            }
        }
        sort_bucket(bucket);

        self.persist_or_restore(iso_date, Some(previous))?;
        Ok(true)
    }

    /// Flip the completion flag of the matching item.
    pub fn mark_completed(&mut self, iso_date: &str, id: usize) -> StoreResult<bool> {
        let Some(bucket) = self.todos.get_mut(iso_date) else {
            return Ok(false);
        };
        let previous = bucket.clone();
        let Some(item) = bucket.iter_mut().find(|t| t.id() == id) else {
            return Ok(false);
        };
        item.toggle_completed();
        self.persist_or_restore(iso_date, Some(previous))?;
        Ok(true)
    }

    /// Remove the item with `id` from the bucket.
    ///
    /// Reports `true` whenever the date exists, even if no item matched.
    pub fn delete_todo(&mut self, iso_date: &str, id: usize) -> StoreResult<bool> {
        let Some(bucket) = self.todos.get_mut(iso_date) else {
            return Ok(false);
        };
        let previous = bucket.clone();
        bucket.retain(|t| t.id() != id);
        self.persist_or_restore(iso_date, Some(previous))?;
        Ok(true)
    }

    pub fn clear_all(&mut self) -> StoreResult<()> {
        let previous = std::mem::take(&mut self.todos);
        if let Err(err) = self.persist() {
            self.todos = previous;
            return Err(err);
        }
        log::info!("cleared all items");
        Ok(())
    }

    /// Fill an empty store with a demo schedule. Returns how many items were
    /// added; a store that already has dates is left alone.
    pub fn seed_samples(&mut self) -> StoreResult<usize> {
        if !self.todos.is_empty() {
            return Ok(0);
        }
        let created_at = Local::now().naive_local();
        for (date_input, content, event_type) in SAMPLE_TODOS {
            let iso_date = to_iso(parse_long_date(date_input)?);
            self.insert_item(&iso_date, content, Some(event_type), created_at);
        }
        if let Err(err) = self.persist() {
            self.todos.clear();
            return Err(err);
        }
        log::info!("seeded {} sample items", SAMPLE_TODOS.len());
        Ok(SAMPLE_TODOS.len())
    }

    /// Every date key present, including dates whose bucket has been emptied.
    pub fn dates_with_todos(&self) -> Vec<String> {
        self.todos.keys().cloned().collect()
    }

    pub fn generate_review(&self, now: NaiveDateTime) -> ReviewReport {
        review::generate_review(&self.todos, &self.event_types, now)
    }

    fn insert_item(
        &mut self,
        iso_date: &str,
        content: &str,
        event_type: Option<&str>,
        created_at: NaiveDateTime,
    ) -> TodoItem {
        let event_type = event_type.unwrap_or(DEFAULT_EVENT_TYPE);
        let classification = self.event_types.classify(event_type);

        let bucket = self.todos.entry(iso_date.to_string()).or_default();
        let item = TodoItem::new(bucket.len(), content, event_type, classification, created_at);
        bucket.push(item.clone());
        sort_bucket(bucket);

        log::debug!("added item {} on {iso_date} ({event_type})", item.id());
        item
    }

    fn persist(&self) -> StoreResult<()> {
        self.storage.save_todos(&self.todos)?;
        log::debug!("persisted {} dates", self.todos.len());
        Ok(())
    }

    /// Persist, or put `previous` back as the bucket for `iso_date` (removing
    /// the date when it did not exist) so memory keeps matching storage.
    fn persist_or_restore(&mut self, iso_date: &str, previous: Option<Vec<TodoItem>>) -> StoreResult<()> {
        let Err(err) = self.persist() else {
            return Ok(());
        };
        log::warn!("rolling back change to {iso_date}: {err}");
        match previous {
            Some(bucket) => {
                self.todos.insert(iso_date.to_string(), bucket);
            }
            None => {
                self.todos.remove(iso_date);
            }
        }
        Err(err)
    }

    /// Bring items written by older versions in line with the event table.
    /// Returns whether anything changed.
    fn normalize_loaded_items(&mut self) -> bool {
        let mut changed = false;
        for (date, bucket) in self.todos.iter_mut() {
            for item in bucket.iter_mut() {
                if item.event_type().is_empty() || item.event_type() == LEGACY_EVENT_TYPE {
                    log::warn!(
                        "migrating item {} on {date} from event type '{}' to '{DEFAULT_EVENT_TYPE}'",
                        item.id(),
                        item.event_type()
                    );
                    item.reclassify(self.event_types.classify(DEFAULT_EVENT_TYPE));
                    changed = true;
                    continue;
                }
                let classification = self.event_types.classify(item.event_type());
                if !item.matches_classification(classification) {
                    item.apply_classification(classification);
                    changed = true;
                }
            }
            if !is_sorted_by_priority(bucket) {
                sort_bucket(bucket);
                changed = true;
            }
        }
        changed
    }
}

fn sort_bucket(bucket: &mut [TodoItem]) {
    bucket.sort_by_key(TodoItem::priority);
}

fn is_sorted_by_priority(bucket: &[TodoItem]) -> bool {
    bucket.windows(2).all(|w| w[0].priority() <= w[1].priority())
}
