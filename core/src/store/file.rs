//! Whole-file JSON snapshot backend.
//!
//! # Design
//! The full collection lives in one pretty-printed JSON array. Each operation
//! holds a single mutex for its entire read-modify-write cycle, so operations
//! are totally ordered and never interleave. The guard is scoped to the call
//! and released on every return path, including errors.
//!
//! Writes go to a sibling `.tmp` file that is then renamed over the snapshot,
//! so a crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, info};

use super::{sort_newest_first, TodoStore};
use crate::error::{StoreError, StoreResult};
use crate::todo::{Todo, TodoId};

pub struct FileStore {
    path: PathBuf,
    /// `true` between `initialize` and `close`.
    ready: Mutex<bool>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ready: Mutex::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Every load re-reads the file, so state behind a poisoned lock is safe
    // to reuse.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.ready.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` inside the critical section, failing if the store is not open.
    fn with_open<T>(&self, op: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        let ready = self.lock();
        if !*ready {
            return Err(StoreError::NotInitialized);
        }
        op()
    }

    /// Read-modify-write: `mutate` edits the loaded collection and the result
    /// is persisted only when it returns `Ok`.
    fn mutate<T>(&self, mutate: impl FnOnce(&mut Vec<Todo>) -> StoreResult<T>) -> StoreResult<T> {
        self.with_open(|| {
            let mut todos = self.load()?;
            let out = mutate(&mut todos)?;
            self.save(&todos)?;
            Ok(out)
        })
    }

    fn load(&self) -> StoreResult<Vec<Todo>> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => {
                error!(
                    "event=store_read module=store backend=file status=error path={} error={}",
                    self.path.display(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn save(&self, todos: &[Todo]) -> StoreResult<()> {
        let mut json = serde_json::to_vec_pretty(todos)?;
        json.push(b'\n');

        let tmp = self.path.with_extension("json.tmp");
        let written = fs::write(&tmp, &json).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(err) = written {
            error!(
                "event=store_write module=store backend=file status=error path={} error={}",
                self.path.display(),
                err
            );
            return Err(err.into());
        }
        debug!(
            "event=store_write module=store backend=file status=ok count={}",
            todos.len()
        );
        Ok(())
    }
}

fn position(todos: &[Todo], id: &TodoId) -> StoreResult<usize> {
    todos
        .iter()
        .position(|t| &t.id == id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))
}

impl TodoStore for FileStore {
    fn initialize(&self) -> StoreResult<()> {
        let mut ready = self.lock();
        if *ready {
            return Ok(());
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        // Surface a corrupt snapshot at startup rather than on first request.
        let count = self.load()?.len();
        *ready = true;
        info!(
            "event=store_open module=store backend=file status=ok path={} count={}",
            self.path.display(),
            count
        );
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        let mut ready = self.lock();
        if *ready {
            *ready = false;
            info!("event=store_close module=store backend=file status=ok");
        }
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<Todo>> {
        self.with_open(|| {
            let mut todos = self.load()?;
            sort_newest_first(&mut todos);
            Ok(todos)
        })
    }

    fn create(&self, todo: Todo) -> StoreResult<Todo> {
        self.mutate(|todos| {
            if todos.iter().any(|t| t.id == todo.id) {
                return Err(StoreError::Duplicate(todo.id.clone()));
            }
            todos.push(todo.clone());
            Ok(todo)
        })
    }

    fn update(&self, id: &TodoId, title: &str) -> StoreResult<()> {
        self.mutate(|todos| {
            let idx = position(todos, id)?;
            todos[idx].title = title.to_string();
            Ok(())
        })
    }

    fn toggle_complete(&self, id: &TodoId) -> StoreResult<()> {
        self.mutate(|todos| {
            let idx = position(todos, id)?;
            todos[idx].completed = !todos[idx].completed;
            Ok(())
        })
    }

    fn delete(&self, id: &TodoId) -> StoreResult<()> {
        self.mutate(|todos| {
            let idx = position(todos, id)?;
            todos.remove(idx);
            Ok(())
        })
    }

    fn clear_completed(&self) -> StoreResult<usize> {
        self.mutate(|todos| {
            let before = todos.len();
            todos.retain(|t| !t.completed);
            Ok(before - todos.len())
        })
    }
}
