//! Request bodies.
//!
//! Create and update share one shape: `{"title": string}`. `title` is the
//! only accepted name for the text field.

use serde::{Deserialize, Serialize};

/// Body of `POST /todos` and `PUT /todos/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoBody {
    pub title: String,
}
