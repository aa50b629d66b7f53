use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use todo_core::{FileStore, SqliteStore, Todo, TodoStore};
use todo_server::{app, app_with_frontend, SharedStore};
use tower::ServiceExt;

const MISSING: &str = "00000000-0000-0000-0000-000000000000";

fn memory_store() -> SharedStore {
    let store = SqliteStore::in_memory();
    store.initialize().unwrap();
    Arc::new(store)
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn list(app: &Router) -> Vec<Todo> {
    let resp = send(app, empty_request("GET", "/todos")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

async fn create(app: &Router, title: &str) -> Todo {
    let body = serde_json::json!({ "title": title }).to_string();
    let resp = send(app, json_request("POST", "/todos", &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let app = app(memory_store());
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn list_todos_is_json_array_with_external_field_names() {
    let app = app(memory_store());
    create(&app, "Buy milk").await;

    let resp = send(&app, empty_request("GET", "/todos")).await;
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/json"
    );
    let raw: serde_json::Value = body_json(resp).await;
    let item = &raw.as_array().unwrap()[0];
    assert!(item["uuid"].is_string());
    assert!(item["created_at"].is_string());
    assert_eq!(item["title"], "Buy milk");
    assert_eq!(item["completed"], false);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201() {
    let app = app(memory_store());
    let resp = send(&app, json_request("POST", "/todos", r#"{"title":"Buy milk"}"#)).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
    assert!(!todo.id.as_str().is_empty());
}

#[tokio::test]
async fn create_alias_route_works() {
    let app = app(memory_store());
    let resp = send(&app, json_request("POST", "/todos/create", r#"{"title":"Alias"}"#)).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(list(&app).await.len(), 1);
}

#[tokio::test]
async fn create_todo_wrong_field_returns_400() {
    let app = app(memory_store());
    let resp = send(&app, json_request("POST", "/todos", r#"{"todo":"old name"}"#)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn create_todo_malformed_json_returns_400() {
    let app = app(memory_store());
    let resp = send(&app, json_request("POST", "/todos", "{not json")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_todo_without_content_type_returns_400() {
    let app = app(memory_store());
    let resp = send(&app, empty_request("POST", "/todos")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_todo_returns_204_and_changes_title() {
    let app = app(memory_store());
    let created = create(&app, "Walk dog").await;

    let uri = format!("/todos/{}", created.id);
    let resp = send(&app, json_request("PUT", &uri, r#"{"title":"Walk cat"}"#)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let todos = list(&app).await;
    assert_eq!(todos[0].title, "Walk cat");
    assert_eq!(todos[0].created_at, created.created_at);
}

#[tokio::test]
async fn update_todo_not_found() {
    let app = app(memory_store());
    let resp = send(
        &app,
        json_request("PUT", &format!("/todos/{MISSING}"), r#"{"title":"Nope"}"#),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_todo_bad_body_returns_400() {
    let app = app(memory_store());
    let created = create(&app, "Keep").await;

    let uri = format!("/todos/{}", created.id);
    let resp = send(&app, json_request("PUT", &uri, r#"{"completed":true}"#)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(list(&app).await[0].title, "Keep");
}

#[tokio::test]
async fn update_todo_blank_id_returns_400() {
    let app = app(memory_store());
    let resp = send(&app, json_request("PUT", "/todos/%20", r#"{"title":"x"}"#)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- toggle ---

#[tokio::test]
async fn toggle_complete_flips_flag() {
    let app = app(memory_store());
    let created = create(&app, "Flip").await;
    let uri = format!("/todos/{}/complete", created.id);

    let resp = send(&app, empty_request("PUT", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(list(&app).await[0].completed);

    let resp = send(&app, empty_request("PUT", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(!list(&app).await[0].completed);
}

#[tokio::test]
async fn toggle_complete_not_found() {
    let app = app(memory_store());
    let resp = send(&app, empty_request("PUT", &format!("/todos/{MISSING}/complete"))).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let app = app(memory_store());
    create(&app, "Untouched").await;
    let before = list(&app).await;

    let resp = send(&app, empty_request("DELETE", "/todos/nonexistent-id")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(list(&app).await, before);
}

// --- clear ---

#[tokio::test]
async fn clear_completed_both_routes() {
    for route in ["/todos/completed", "/todos/clear"] {
        let app = app(memory_store());
        let milk = create(&app, "buy milk").await;
        let resp = send(&app, empty_request("PUT", &format!("/todos/{}/complete", milk.id))).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        create(&app, "buy eggs").await;

        let resp = send(&app, empty_request("DELETE", route)).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT, "{route}");

        let titles: Vec<String> = list(&app).await.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["buy eggs"], "{route}");
    }
}

// --- storage failures ---

#[tokio::test]
async fn closed_store_returns_500() {
    let store = memory_store();
    let app = app(Arc::clone(&store));
    store.close().unwrap();

    let resp = send(&app, empty_request("GET", "/todos")).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = send(&app, empty_request("DELETE", "/todos/completed")).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// --- CORS ---

#[tokio::test]
async fn cors_preflight_is_allowed() {
    let app = app(memory_store());
    let resp = send(
        &app,
        Request::builder()
            .method("OPTIONS")
            .uri("/todos")
            .header(http::header::ORIGIN, "http://localhost:5173")
            .header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(String::new())
            .unwrap(),
    )
    .await;

    assert!(resp.status().is_success());
    assert_eq!(resp.headers()[http::header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

// --- static frontend ---

#[tokio::test]
async fn frontend_served_beside_api() {
    let dist = tempfile::tempdir().unwrap();
    std::fs::write(dist.path().join("index.html"), "<h1>todos</h1>").unwrap();
    let app = app_with_frontend(memory_store(), dist.path());

    let resp = send(&app, empty_request("GET", "/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "<h1>todos</h1>");

    let resp = send(&app, empty_request("GET", "/index.html")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // API paths still reach the handlers.
    assert!(list(&app).await.is_empty());
    create(&app, "from api").await;
    assert_eq!(list(&app).await.len(), 1);

    let resp = send(&app, empty_request("PUT", "/todos/completed")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = send(&app, empty_request("GET", "/missing.js")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle over the file backend ---

#[tokio::test]
async fn crud_lifecycle_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("todos.json"));
    store.initialize().unwrap();
    let app = app(Arc::new(store));

    // create
    let created = create(&app, "Walk dog").await;
    let id = created.id.clone();

    // list: should contain the one todo
    assert_eq!(list(&app).await, vec![created]);

    // update
    let resp = send(
        &app,
        json_request("PUT", &format!("/todos/{id}"), r#"{"title":"Walk cat"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // toggle
    let resp = send(&app, empty_request("PUT", &format!("/todos/{id}/complete"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let todos = list(&app).await;
    assert_eq!(todos[0].title, "Walk cat");
    assert!(todos[0].completed);

    // delete
    let resp = send(&app, empty_request("DELETE", &format!("/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // delete again: 404
    let resp = send(&app, empty_request("DELETE", &format!("/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: empty
    assert!(list(&app).await.is_empty());
}
