use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    pub fn new(id: i64, user_id: i64, title: &str, completed: bool) -> Self {
        Self {
            id,
            user_id,
            title: title.to_string(),
            completed,
        }
    }
}

/// How `GET /todos` should misbehave.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Fault {
    #[default]
    None,
    /// Answer with this status and a plain-text body.
    Status(u16),
    /// Answer 200 with a body that is not valid JSON.
    MalformedBody,
}

#[derive(Debug, Default)]
struct Inner {
    todos: Vec<Todo>,
    fault: Fault,
    delay: Option<Duration>,
    hits: u64,
}

/// Shared, mutable fixture behind the router. Cloning shares the fixture, so
/// a test can keep one handle and reconfigure a running server.
#[derive(Clone, Debug, Default)]
pub struct MockState {
    inner: Arc<RwLock<Inner>>,
}

impl MockState {
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                todos,
                ..Inner::default()
            })),
        }
    }

    pub async fn set_todos(&self, todos: Vec<Todo>) {
        self.inner.write().await.todos = todos;
    }

    pub async fn set_fault(&self, fault: Fault) {
        self.inner.write().await.fault = fault;
    }

    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.inner.write().await.delay = delay;
    }

    /// Number of `GET /todos` requests served so far.
    pub async fn hits(&self) -> u64 {
        self.inner.read().await.hits
    }
}

/// The records the binary serves by default.
pub fn sample_todos() -> Vec<Todo> {
    vec![
        Todo::new(1, 101, "Sample Item 1", false),
        Todo::new(2, 101, "Sample Item 2", true),
        Todo::new(3, 102, "Sample Item 3", false),
    ]
}

pub fn app() -> Router {
    app_with(MockState::with_todos(sample_todos()))
}

pub fn app_with(state: MockState) -> Router {
    Router::new()
        .route("/todos", get(list_todos))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(state)).await
}

async fn list_todos(State(state): State<MockState>) -> Response {
    let (todos, fault, delay) = {
        let mut inner = state.inner.write().await;
        inner.hits += 1;
        (inner.todos.clone(), inner.fault.clone(), inner.delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    debug!(?fault, count = todos.len(), "GET /todos");

    match fault {
        Fault::None => Json(todos).into_response(),
        Fault::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "injected failure").into_response()
        }
        Fault::MalformedBody => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            r#"[{"id":1,"userId":"#,
        )
            .into_response(),
    }
}
