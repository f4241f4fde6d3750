//! Core types for favbot

use serde::{Deserialize, Serialize};

/// A post as seen by the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
}

impl Post {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// An account as seen by the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub handle: String,
}

impl User {
    pub fn new(id: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handle: handle.into(),
        }
    }
}

/// Maximum number of items to gather; `None` gathers everything
pub type Limit = Option<usize>;

/// Convert a configured count to a [`Limit`] (0 means unbounded)
pub fn limit_from_count(count: usize) -> Limit {
    if count == 0 {
        None
    } else {
        Some(count)
    }
}

/// Append "s" unless the count is exactly one
pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
