use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::persistence::JsonFileStorage;
use crate::store::{StoreResult, TodoStore};

pub const DATA_PATH_VAR: &str = "TODO_TRACKER_DATA";
pub const BACKEND_VAR: &str = "TODO_TRACKER_BACKEND";
pub const HTTP_ADDR_VAR: &str = "TODO_TRACKER_HTTP_ADDR";
pub const SEED_SAMPLES_VAR: &str = "TODO_TRACKER_SEED_SAMPLES";

const DEFAULT_DATA_PATH: &str = "todos.json";
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Json,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub data_path: PathBuf,
    pub backend: Backend,
    pub http_addr: SocketAddr,
    /// Fill an empty store with the demo schedule on startup.
    pub seed_samples: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            backend: Backend::Json,
            http_addr: DEFAULT_HTTP_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 5000))),
            seed_samples: false,
        }
    }
}

impl TrackerConfig {
    /// Read settings from the process environment, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup(DATA_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(backend) = lookup(BACKEND_VAR) {
            config.backend = backend.parse()?;
        }
        if let Some(addr) = lookup(HTTP_ADDR_VAR) {
            config.http_addr = addr
                .parse()
                .map_err(|err| format!("invalid {HTTP_ADDR_VAR} '{addr}': {err}"))?;
        }
        if let Some(flag) = lookup(SEED_SAMPLES_VAR) {
            config.seed_samples = parse_flag(&flag)
                .ok_or_else(|| format!("invalid {SEED_SAMPLES_VAR} '{flag}': expected true or false"))?;
        }
        Ok(config)
    }

    /// Open the configured backend, seeding the demo schedule when asked to
    /// and the store is empty.
    pub fn open_store(&self) -> StoreResult<TodoStore> {
        let mut store = match self.backend {
            Backend::Json => TodoStore::open(Box::new(JsonFileStorage::new(&self.data_path)))?,
            #[cfg(feature = "sqlite")]
            Backend::Sqlite => {
                let storage = crate::persistence::sqlite::SqliteTodoStorage::new(&self.data_path)?;
                TodoStore::open(Box::new(storage))?
            }
        };
        if self.seed_samples {
            store.seed_samples()?;
        }
        Ok(store)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
