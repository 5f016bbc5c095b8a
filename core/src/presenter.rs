//! Presenter driving the todo list screen.
//!
//! # Design
//! The presenter owns a single `UiState` behind a `tokio::sync::watch`
//! channel: views subscribe and always get the latest value first, then every
//! replacement. Nothing outside the presenter can write to it.
//!
//! A load publishes `Loading` before the query task is spawned, so observers
//! see `Loading` ahead of that load's result. Loads are never cancelled. Each
//! one is tagged with a generation number, and a result is published only if
//! no newer load has started since; an older load finishing late is dropped.
//! Both the tag bump and the tag check run inside the channel's write lock.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::state::UiState;
use crate::usecase::TodosQuery;

const NOTICE_CAPACITY: usize = 16;

/// A transient, user-visible notification (a toast, a status line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

pub struct TodosPresenter {
    query: Arc<dyn TodosQuery>,
    state: Arc<watch::Sender<UiState>>,
    notices: broadcast::Sender<Notice>,
    generation: Arc<AtomicU64>,
}

impl TodosPresenter {
    /// Creates a presenter in the `Loading` state without issuing a load.
    pub fn new(query: Arc<dyn TodosQuery>) -> Self {
        let (state, _) = watch::channel(UiState::Loading);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            query,
            state: Arc::new(state),
            notices,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a presenter and issues the startup load.
    ///
    /// Must be called from within a Tokio runtime. The load may settle before
    /// the caller gets to `notices()`, so the startup notice can be missed;
    /// callers that need it use `new`, subscribe, then `load_todos`.
    pub fn start(query: Arc<dyn TodosQuery>) -> Self {
        let presenter = Self::new(query);
        presenter.load_todos();
        presenter
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// One `Notice` per failed load that made it to the screen.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Publishes `Loading`, then runs the query on a new task.
    ///
    /// Must be called from within a Tokio runtime. The returned handle
    /// resolves once the result has been published or discarded; dropping it
    /// does not cancel the load.
    pub fn load_todos(&self) -> JoinHandle<()> {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = UiState::Loading;
        });
        debug!(generation, "loading todos");

        let query = Arc::clone(&self.query);
        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.generation);
        let notices = self.notices.clone();

        tokio::spawn(async move {
            let next = settle(query.as_ref()).await;
            let notice = next.error_message().map(|message| Notice {
                message: message.to_string(),
            });

            let published = state.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *current = next;
                true
            });
            if !published {
                debug!(generation, "discarding stale todo load");
                return;
            }
            if let Some(notice) = notice {
                let _ = notices.send(notice);
            }
        })
    }

    /// Same as `load_todos`.
    pub fn refresh(&self) -> JoinHandle<()> {
        self.load_todos()
    }
}

async fn settle(query: &dyn TodosQuery) -> UiState {
    match AssertUnwindSafe(query.get_todos()).catch_unwind().await {
        Ok(Ok(items)) => UiState::Success(items),
        Ok(Err(err)) => UiState::Error(err.display_message().to_string()),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "todo query panicked");
            UiState::Error(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    FetchError::new(message).display_message().to_string()
}
