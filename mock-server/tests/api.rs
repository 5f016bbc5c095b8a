use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, sample_todos, Fault, MockState, Todo};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- list ---

#[tokio::test]
async fn list_todos_serves_sample_fixture() {
    let resp = app().oneshot(get("/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos, sample_todos());
}

#[tokio::test]
async fn list_todos_uses_wire_field_names() {
    let resp = app().oneshot(get("/todos")).await.unwrap();

    let json: serde_json::Value = body_json(resp).await;
    let first = &json.as_array().unwrap()[0];
    assert_eq!(first["id"], 1);
    assert_eq!(first["userId"], 101);
    assert_eq!(first["title"], "Sample Item 1");
    assert_eq!(first["completed"], false);
}

#[tokio::test]
async fn list_todos_empty() {
    let resp = app_with(MockState::default())
        .oneshot(get("/todos"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn list_todos_preserves_fixture_order_and_duplicates() {
    let fixture = vec![
        Todo::new(5, 1, "e", false),
        Todo::new(1, 1, "a", true),
        Todo::new(5, 1, "e", false),
    ];
    let resp = app_with(MockState::with_todos(fixture.clone()))
        .oneshot(get("/todos"))
        .await
        .unwrap();

    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos, fixture);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app().oneshot(get("/todos/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_is_not_allowed() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/todos")
                .header(header::CONTENT_TYPE, "application/json")
                .body(r#"{"title":"x"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- faults ---

#[tokio::test]
async fn status_fault_is_served() {
    let state = MockState::with_todos(sample_todos());
    state.set_fault(Fault::Status(503)).await;

    let resp = app_with(state).oneshot(get("/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_bytes(resp).await, "injected failure");
}

#[tokio::test]
async fn invalid_status_code_falls_back_to_500() {
    let state = MockState::default();
    state.set_fault(Fault::Status(42)).await;

    let resp = app_with(state).oneshot(get("/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn malformed_body_fault_is_not_json() {
    let state = MockState::default();
    state.set_fault(Fault::MalformedBody).await;

    let resp = app_with(state).oneshot(get("/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());
}

// --- shared state ---

#[tokio::test]
async fn reconfiguring_state_affects_running_router() {
    use tower::Service;

    let state = MockState::with_todos(sample_todos());
    let mut app = app_with(state.clone()).into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/todos"))
        .await
        .unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 3);

    state.set_todos(Vec::new()).await;
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/todos"))
        .await
        .unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());

    state.set_fault(Fault::Status(500)).await;
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/todos"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(state.hits().await, 3);
}
