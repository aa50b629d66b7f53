//! Todo entity and persistence for the todo service.
//!
//! # Overview
//! `Todo` is the record; `TodoStore` is the contract every backend honors.
//! The HTTP layer holds one store instance for the life of the process and
//! calls it once per request.
//!
//! # Design
//! - Store operations are synchronous and each one is atomic with respect to
//!   concurrent callers.
//! - `update`, `toggle_complete` and `delete` report a missing id as
//!   `StoreError::NotFound`, never as a silent no-op.
//! - The store has an explicit lifecycle (`initialize` / `close`) and is
//!   passed around by the caller instead of living in a global.

pub mod error;
pub mod store;
pub mod todo;

pub use error::{StoreError, StoreResult};
pub use store::{FileStore, SqliteStore, TodoStore};
pub use todo::{Todo, TodoId};
