//! Client core for the todo list screen.
//!
//! # Overview
//! Fetches `GET <base>/todos`, maps the records into domain items, uppercases
//! their titles, and publishes the result as a tri-state `UiState` that views
//! subscribe to.
//!
//! # Design
//! - Data flows one way: presenter → use case → repository → transport, and
//!   back as raw records → domain items → transformed items → `UiState`.
//! - `TodoClient` stays stateless and I/O free (`build_*` / `parse_*`); the
//!   `Transport` between the two halves is the only thing that touches the
//!   network.
//! - Transport failures of every kind collapse into one `FetchError` at the
//!   repository boundary.
//! - The presenter owns the state; views only read it through a
//!   `watch::Receiver`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod presenter;
pub mod repository;
pub mod state;
pub mod transport;
pub mod types;
pub mod usecase;

use std::sync::Arc;

pub use client::TodoClient;
pub use config::ClientConfig;
pub use error::{ApiError, FetchError, Outcome, UNKNOWN_ERROR};
pub use http::{HttpRequest, HttpResponse};
pub use presenter::{Notice, TodosPresenter};
pub use repository::{RemoteTodoRepository, TodoRepository};
pub use state::UiState;
pub use transport::{Transport, UreqTransport};
pub use types::{TodoDto, TodoItem};
pub use usecase::{GetTodosUseCase, TodosQuery};

/// Wires `UreqTransport -> RemoteTodoRepository -> GetTodosUseCase` under a
/// new presenter. No load is issued; call `load_todos` (or use
/// `TodosPresenter::start` with `use_case`) to begin.
pub fn presenter(config: &ClientConfig) -> TodosPresenter {
    TodosPresenter::new(use_case(config))
}

/// The query half of `presenter`, for callers that construct the presenter
/// themselves.
pub fn use_case(config: &ClientConfig) -> Arc<dyn TodosQuery> {
    let repository = RemoteTodoRepository::new(
        TodoClient::new(&config.base_url),
        UreqTransport::new(config.timeout()),
    );
    Arc::new(GetTodosUseCase::new(Arc::new(repository)))
}
