//! Persistence contract for the todo collection.
//!
//! # Design
//! `TodoStore` is synchronous: every call performs blocking file or SQLite
//! I/O and returns once the change is durable. Async callers are expected to
//! run it on a blocking thread. Implementations are `Send + Sync` so a single
//! instance can be shared behind an `Arc` by all request handlers.
//!
//! Two backends implement the same contract:
//! - [`FileStore`] rewrites one JSON snapshot under a process-wide lock.
//! - [`SqliteStore`] keeps one row per todo and issues targeted statements.
//!
//! In both, `update`, `toggle_complete` and `delete` on an unknown id return
//! `StoreError::NotFound` and leave the collection untouched.

mod file;
mod sqlite;

pub use file::FileStore;
pub use sqlite::SqliteStore;

use crate::error::StoreResult;
use crate::todo::{Todo, TodoId};

pub trait TodoStore: Send + Sync {
    /// Prepare the backing medium. Idempotent; concurrent callers are
    /// serialized and only the first one does any work.
    fn initialize(&self) -> StoreResult<()>;

    /// Release held resources. Safe to call without `initialize`.
    fn close(&self) -> StoreResult<()>;

    /// All todos, newest first.
    fn list(&self) -> StoreResult<Vec<Todo>>;

    /// Persist a fully-formed todo and echo it back.
    fn create(&self, todo: Todo) -> StoreResult<Todo>;

    fn update(&self, id: &TodoId, title: &str) -> StoreResult<()>;

    fn toggle_complete(&self, id: &TodoId) -> StoreResult<()>;

    fn delete(&self, id: &TodoId) -> StoreResult<()>;

    /// Remove every completed todo and return how many were removed.
    fn clear_completed(&self) -> StoreResult<usize>;
}

/// Default list order: `created_at` descending, ties broken by id so the
/// order is stable across backends.
pub(crate) fn sort_newest_first(todos: &mut [Todo]) {
    todos.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
