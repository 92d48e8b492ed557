pub mod calendar;
pub mod config;
pub mod event_type;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod review;
pub mod store;
pub mod todo;

pub use calendar::{DateRange, REVIEW_WINDOW_DAYS, parse_iso_date, parse_long_date, to_iso};
pub use config::{Backend, TrackerConfig};
pub use event_type::{DEFAULT_EVENT_TYPE, EventType, EventTypeTable};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTodoStorage;
pub use persistence::{
    JsonFileStorage, PersistenceError, PersistenceResult, TodoStorage, load_todos_from_json,
    save_todos_to_json,
};
pub use review::{EventTypeStats, HighFrequencyType, ReviewPeriod, ReviewReport, generate_review};
pub use store::{StoreError, StoreResult, TodoStore};
pub use todo::{TodoItem, TodoMap, TodoPatch};
