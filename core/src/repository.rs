//! Repository over the remote todo API.
//!
//! Every transport or decoding failure is folded into a `FetchError` here, so
//! nothing above this layer ever sees an `ApiError`.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::{ApiError, FetchError, Outcome};
use crate::transport::Transport;
use crate::types::{TodoDto, TodoItem};

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn fetch_todos(&self) -> Outcome<Vec<TodoItem>>;
}

/// One network round-trip per `fetch_todos` call; nothing is kept between
/// calls.
pub struct RemoteTodoRepository<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> RemoteTodoRepository<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    async fn fetch_dtos(&self) -> Result<Vec<TodoDto>, ApiError> {
        let response = self.transport.execute(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }
}

#[async_trait]
impl<T: Transport> TodoRepository for RemoteTodoRepository<T> {
    async fn fetch_todos(&self) -> Outcome<Vec<TodoItem>> {
        match self.fetch_dtos().await {
            Ok(dtos) => {
                debug!(count = dtos.len(), "fetched todos");
                Ok(dtos.into_iter().map(TodoItem::from).collect())
            }
            Err(err) => {
                warn!(base_url = self.client.base_url(), error = %err, "todo fetch failed");
                Err(FetchError::from(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    /// Answers every request with the same canned result.
    struct CannedTransport {
        status: u16,
        body: &'static str,
        fail: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl CannedTransport {
        fn ok(body: &'static str) -> Self {
            Self {
                status: 200,
                body,
                fail: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn status(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                fail: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn unreachable(message: &'static str) -> Self {
            Self {
                status: 0,
                body: "",
                fail: Some(message),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            assert_eq!(request.url, "http://localhost:3000/todos");
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.fail {
                return Err(ApiError::Transport(message.to_string()));
            }
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.to_string(),
            })
        }
    }

    fn repository(transport: CannedTransport) -> RemoteTodoRepository<CannedTransport> {
        RemoteTodoRepository::new(TodoClient::new("http://localhost:3000"), transport)
    }

    #[tokio::test]
    async fn maps_records_in_order() {
        let repo = repository(CannedTransport::ok(
            r#"[
                {"id":2,"userId":101,"title":"second","completed":true},
                {"id":1,"userId":101,"title":"first","completed":false},
                {"id":1,"userId":101,"title":"first","completed":false}
            ]"#,
        ));
        let todos = repo.fetch_todos().await.unwrap();
        let ids: Vec<i64> = todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1, 1]);
        assert_eq!(todos[0].title, "second");
        assert_eq!(repo.transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_body_is_ok() {
        let repo = repository(CannedTransport::ok("[]"));
        assert_eq!(repo.fetch_todos().await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn transport_failure_becomes_fetch_error() {
        let repo = repository(CannedTransport::unreachable("Network error occurred"));
        let err = repo.fetch_todos().await.unwrap_err();
        assert_eq!(err.message(), Some("Network error occurred"));
    }

    #[tokio::test]
    async fn non_2xx_becomes_fetch_error() {
        let repo = repository(CannedTransport::status(502, "bad gateway"));
        let err = repo.fetch_todos().await.unwrap_err();
        assert_eq!(err.display_message(), "HTTP 502: bad gateway");
    }

    #[tokio::test]
    async fn malformed_body_becomes_fetch_error() {
        let repo = repository(CannedTransport::ok("[{"));
        let err = repo.fetch_todos().await.unwrap_err();
        assert!(err.display_message().starts_with("deserialization failed"));
    }

    #[tokio::test]
    async fn each_call_is_a_new_round_trip() {
        let repo = repository(CannedTransport::ok("[]"));
        repo.fetch_todos().await.unwrap();
        repo.fetch_todos().await.unwrap();
        assert_eq!(repo.transport.calls.load(Ordering::SeqCst), 2);
    }
}
