//! SQLite table backend.
//!
//! # Design
//! One row per todo in a `todos` table keyed by `uuid`. Mutations are single
//! targeted statements; "not found" is detected from the affected-row count,
//! never assumed away.
//!
//! The connection is opened once by `initialize` and kept in a
//! `Mutex<Option<Connection>>`: rusqlite connections are `Send` but not
//! `Sync`, so the mutex is what lets one handle be shared by every request.
//! Each lock covers one statement, and SQLite's own statement atomicity
//! decides same-id races.
//!
//! `created_at` is stored as fixed-width RFC 3339 UTC text with nanosecond
//! precision, so ordering by the text column is ordering by time and a reload
//! returns the exact timestamp that was written.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{error, info};
use rusqlite::{params, Connection, ErrorCode, Row};

use super::TodoStore;
use crate::error::{StoreError, StoreResult};
use crate::todo::{Todo, TodoId};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS todos (
    uuid TEXT PRIMARY KEY,
    created_at DATETIME NOT NULL,
    todo TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_completed ON todos(completed);
";

const TODO_SELECT_SQL: &str = "SELECT uuid, created_at, todo, completed FROM todos";

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

pub struct SqliteStore {
    location: Location,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// A store backed by the database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_location(Location::File(path.into()))
    }

    /// A private in-memory database; its contents vanish on `close`.
    pub fn in_memory() -> Self {
        Self::with_location(Location::Memory)
    }

    fn with_location(location: Location) -> Self {
        Self {
            location,
            conn: Mutex::new(None),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(StoreError::NotInitialized)?;
        op(conn)
    }

    fn open(&self) -> StoreResult<Connection> {
        let conn = match &self.location {
            Location::File(path) => {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    fs::create_dir_all(dir)?;
                }
                Connection::open(path)?
            }
            Location::Memory => Connection::open_in_memory()?,
        };
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(conn)
    }

    fn mode(&self) -> &'static str {
        match self.location {
            Location::File(_) => "file",
            Location::Memory => "memory",
        }
    }
}

/// Map "zero rows touched" to `NotFound`.
fn expect_one(affected: usize, id: &TodoId) -> StoreResult<()> {
    if affected == 0 {
        return Err(StoreError::NotFound(id.clone()));
    }
    Ok(())
}

fn timestamp_to_db(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn timestamp_from_db(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|err| StoreError::InvalidData(format!("created_at {raw:?}: {err}")))
}

fn parse_todo_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, bool)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

impl TodoStore for SqliteStore {
    fn initialize(&self) -> StoreResult<()> {
        let mut guard = self.lock();
        if guard.is_some() {
            return Ok(());
        }

        let started_at = Instant::now();
        match self.open() {
            Ok(conn) => {
                *guard = Some(conn);
                info!(
                    "event=store_open module=store backend=sqlite status=ok mode={} duration_ms={}",
                    self.mode(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_open module=store backend=sqlite status=error mode={} duration_ms={} error={}",
                    self.mode(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn close(&self) -> StoreResult<()> {
        let Some(conn) = self.lock().take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, err)| {
            error!("event=store_close module=store backend=sqlite status=error error={err}");
            StoreError::Sqlite(err)
        })?;
        info!("event=store_close module=store backend=sqlite status=ok");
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<Todo>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{TODO_SELECT_SQL} ORDER BY created_at DESC, uuid ASC"))?;
            let rows = stmt.query_map([], parse_todo_row)?;

            let mut todos = Vec::new();
            for row in rows {
                let (id, created_at, title, completed) = row?;
                todos.push(Todo {
                    id: TodoId::from(id),
                    created_at: timestamp_from_db(&created_at)?,
                    title,
                    completed,
                });
            }
            Ok(todos)
        })
    }

    fn create(&self, todo: Todo) -> StoreResult<Todo> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO todos (uuid, created_at, todo, completed) VALUES (?1, ?2, ?3, ?4)",
                params![
                    todo.id.as_str(),
                    timestamp_to_db(&todo.created_at),
                    todo.title.as_str(),
                    todo.completed,
                ],
            );
            match inserted {
                Ok(_) => Ok(todo),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::Duplicate(todo.id))
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    fn update(&self, id: &TodoId, title: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE todos SET todo = ?1 WHERE uuid = ?2",
                params![title, id.as_str()],
            )?;
            expect_one(affected, id)
        })
    }

    fn toggle_complete(&self, id: &TodoId) -> StoreResult<()> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE todos SET completed = NOT completed WHERE uuid = ?1",
                params![id.as_str()],
            )?;
            expect_one(affected, id)
        })
    }

    fn delete(&self, id: &TodoId) -> StoreResult<()> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM todos WHERE uuid = ?1", params![id.as_str()])?;
            expect_one(affected, id)
        })
    }

    fn clear_completed(&self) -> StoreResult<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM todos WHERE completed = 1", [])?))
    }
}
