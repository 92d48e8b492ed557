use super::{PersistenceResult, TodoStorage};
use crate::todo::{TodoItem, TodoMap};
use rusqlite::{Connection, params};
use std::sync::Mutex;

/// Keeps each item as its own keyed record instead of one document.
pub struct SqliteTodoStorage {
    connection: Mutex<Connection>,
}

impl SqliteTodoStorage {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS todo_dates (
                date TEXT PRIMARY KEY
            );
            CREATE TABLE IF NOT EXISTS todo_items (
                date TEXT NOT NULL REFERENCES todo_dates(date),
                position INTEGER NOT NULL,
                item_json TEXT NOT NULL,
                PRIMARY KEY (date, position)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| super::PersistenceError::InvalidData("sqlite mutex poisoned".into()))
    }
}

impl TodoStorage for SqliteTodoStorage {
    fn save_todos(&self, todos: &TodoMap) -> PersistenceResult<()> {
        super::validate_todos(todos)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM todo_items", [])?;
        tx.execute("DELETE FROM todo_dates", [])?;
        {
            let mut date_stmt = tx.prepare("INSERT INTO todo_dates (date) VALUES (?1)")?;
            let mut item_stmt = tx.prepare(
                "INSERT INTO todo_items (date, position, item_json) VALUES (?1, ?2, ?3)",
            )?;
            for (date, items) in todos {
                date_stmt.execute(params![date])?;
                for (position, item) in items.iter().enumerate() {
                    let json = serde_json::to_string(item)?;
                    item_stmt.execute(params![date, position as i64, json])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_todos(&self) -> PersistenceResult<Option<TodoMap>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT date FROM todo_dates ORDER BY date ASC")?;
        let dates = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        if dates.is_empty() {
            return Ok(None);
        }

        let mut todos = TodoMap::new();
        for date in dates {
            todos.insert(date, Vec::new());
        }

        let mut stmt =
            conn.prepare("SELECT date, item_json FROM todo_items ORDER BY date ASC, position ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (date, json) = row?;
            let item: TodoItem = serde_json::from_str(&json)?;
            todos.entry(date).or_default().push(item);
        }

        super::validate_todos(&todos)?;
        Ok(Some(todos))
    }
}
