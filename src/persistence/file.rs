use super::{PersistenceResult, TodoStorage};
use crate::todo::TodoMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Stores the snapshot as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TodoStorage for JsonFileStorage {
    fn save_todos(&self, todos: &TodoMap) -> PersistenceResult<()> {
        save_todos_to_json(todos, &self.path)
    }

    fn load_todos(&self) -> PersistenceResult<Option<TodoMap>> {
        match File::open(&self.path) {
            Ok(file) => {
                let todos: TodoMap = serde_json::from_reader(file)?;
                super::validate_todos(&todos)?;
                Ok(Some(todos))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Write `todos` to `path`, replacing the previous document only once the new
/// one is fully written.
pub fn save_todos_to_json<P: AsRef<Path>>(todos: &TodoMap, path: P) -> PersistenceResult<()> {
    let path = path.as_ref();
    let tmp_path = staging_path(path);
    let result = write_staging(todos, &tmp_path)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(Into::into));
    if result.is_err() {
        if let Err(err) = fs::remove_file(&tmp_path) {
            log::debug!("could not remove {}: {err}", tmp_path.display());
        }
    }
    result
}

fn write_staging(todos: &TodoMap, tmp_path: &Path) -> PersistenceResult<()> {
    let file = File::create(tmp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, todos)?;
    writer.flush()?;
    Ok(())
}

pub fn load_todos_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<TodoMap> {
    let file = File::open(path)?;
    let todos: TodoMap = serde_json::from_reader(file)?;
    super::validate_todos(&todos)?;
    Ok(todos)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "todos.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
