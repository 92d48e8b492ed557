use crate::todo::TodoMap;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Backing storage for the full date-to-items snapshot.
///
/// Every save replaces the whole snapshot; `load_todos` returns `None` when
/// nothing has been stored yet.
pub trait TodoStorage: Send + Sync {
    fn save_todos(&self, todos: &TodoMap) -> PersistenceResult<()>;
    fn load_todos(&self) -> PersistenceResult<Option<TodoMap>>;
}

/// Reject date keys that are not ISO calendar dates.
pub fn validate_todos(todos: &TodoMap) -> PersistenceResult<()> {
    for date in todos.keys() {
        if crate::calendar::parse_iso_date(date).is_none() {
            return Err(PersistenceError::InvalidData(format!(
                "date key '{date}' is not in YYYY-MM-DD form"
            )));
        }
    }
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonFileStorage, load_todos_from_json, save_todos_to_json};
