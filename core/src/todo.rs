//! The todo record and its creation rules.
//!
//! # Design
//! `TodoId` wraps an opaque string rather than a parsed `Uuid`. New ids are
//! generated from random v4 UUIDs, but lookups accept any string so that an
//! unknown or malformed id surfaces as `StoreError::NotFound` from the store
//! instead of a parse failure at the edge.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, immutable identifier of a todo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// A fresh identifier backed by a random v4 UUID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single list item.
///
/// `id` and `created_at` are fixed at creation; only `title` and `completed`
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "uuid")]
    pub id: TodoId,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    /// Build a new, not yet completed todo stamped with the current time.
    ///
    /// The title is taken as-is; an empty string is a valid title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: TodoId::generate(),
            created_at: Utc::now(),
            title: title.into(),
            completed: false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}
