//! Transport records and domain records for todo items.
//!
//! # Design
//! `TodoDto` mirrors the wire schema (`userId` in camelCase) and is the only
//! type serde ever sees. `TodoItem` is what the rest of the crate passes
//! around. The mapping between them is a one-to-one field copy, so a schema
//! change on the wire stays contained in this file.

use serde::{Deserialize, Serialize};

/// A single todo record as returned by `GET /todos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoDto {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

/// An immutable todo item.
///
/// Identifiers are stable keys for list rendering but are not required to be
/// unique; the core never deduplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TodoItem {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

impl TodoItem {
    /// Return a copy with the title uppercased. Every other field is kept.
    pub fn with_uppercase_title(self) -> Self {
        Self {
            title: self.title.to_uppercase(),
            ..self
        }
    }
}

impl From<TodoDto> for TodoItem {
    fn from(dto: TodoDto) -> Self {
        Self {
            id: dto.id,
            user_id: dto.user_id,
            title: dto.title,
            completed: dto.completed,
        }
    }
}
