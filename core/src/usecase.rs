//! The query the presenter runs: fetch, then apply business rules.
//!
//! Title uppercasing is the only rule today. Filtering, sorting or
//! deduplication would go in `GetTodosUseCase::get_todos`, not in the
//! presenter or the repository.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Outcome;
use crate::repository::TodoRepository;
use crate::types::TodoItem;

/// What the presenter depends on.
#[async_trait]
pub trait TodosQuery: Send + Sync {
    async fn get_todos(&self) -> Outcome<Vec<TodoItem>>;
}

pub struct GetTodosUseCase {
    repository: Arc<dyn TodoRepository>,
}

impl GetTodosUseCase {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl TodosQuery for GetTodosUseCase {
    /// Calls the repository once. On success every title is uppercased and
    /// order is preserved; failures come back untouched.
    async fn get_todos(&self) -> Outcome<Vec<TodoItem>> {
        let todos = self.repository.fetch_todos().await?;
        Ok(todos.into_iter().map(TodoItem::with_uppercase_title).collect())
    }
}
