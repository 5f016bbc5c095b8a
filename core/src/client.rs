//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Listing is split into `build_list_todos`, which produces an
//! `HttpRequest`, and `parse_list_todos`, which consumes an `HttpResponse`.
//! Whoever sits in between (a `Transport`, or a test) does the actual I/O.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::TodoDto;

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            url: format!("{}/todos", self.base_url),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<TodoDto>, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// Map non-2xx status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.url, "http://localhost:3000/todos");
        assert_eq!(
            req.headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("https://jsonplaceholder.typicode.com/");
        assert_eq!(client.base_url(), "https://jsonplaceholder.typicode.com");
        assert_eq!(
            client.build_list_todos().url,
            "https://jsonplaceholder.typicode.com/todos"
        );
    }

    #[test]
    fn parse_list_todos_success() {
        let body = r#"[
            {"userId":1,"id":1,"title":"delectus aut autem","completed":false},
            {"userId":1,"id":2,"title":"quis ut nam facilis","completed":true}
        ]"#;
        let todos = client().parse_list_todos(response(200, body)).unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].title, "delectus aut autem");
        assert!(todos[1].completed);
    }

    #[test]
    fn parse_list_todos_empty() {
        let todos = client().parse_list_todos(response(200, "[]")).unwrap();
        assert!(todos.is_empty());
    }

    #[test]
    fn parse_list_todos_accepts_any_2xx() {
        let todos = client().parse_list_todos(response(203, "[]")).unwrap();
        assert!(todos.is_empty());
    }

    #[test]
    fn parse_list_todos_server_error() {
        let err = client()
            .parse_list_todos(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
        assert_eq!(err.to_string(), "HTTP 500: internal error");
    }

    #[test]
    fn parse_list_todos_not_found_is_plain_http_error() {
        let err = client().parse_list_todos(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 404, .. }));
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client().parse_list_todos(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_list_todos_wrong_shape() {
        let err = client()
            .parse_list_todos(response(200, r#"{"id":1}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
